use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;

/// Raw HTTP answer; status interpretation happens in the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a GET with URL-encoded query parameters.
///
/// An `Err` means no HTTP answer was received at all.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get(&self, url: &str, query: &[(&'static str, String)]) -> Result<HttpReply>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self { http: Client::new() }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, query: &[(&'static str, String)]) -> Result<HttpReply> {
        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {url}"))?;

        let status = res.status().as_u16();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {url}"))?;

        Ok(HttpReply { status, body })
    }
}
