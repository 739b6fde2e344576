use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::{io::ErrorKind, path::PathBuf};

use super::{LocationSource, PositionError, PositionOptions};
use crate::model::Coordinates;

/// Reads the latest fix written by a GPS daemon or similar as
/// `{"lat": .., "lon": .., "timestamp": <unix seconds>}`.
#[derive(Debug, Clone)]
pub struct FixFileSource {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct Fix {
    lat: f64,
    lon: f64,
    timestamp: i64,
}

impl FixFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl LocationSource for FixFileSource {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, PositionError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|err| match err.kind() {
            ErrorKind::NotFound => PositionError::PositionUnavailable,
            ErrorKind::PermissionDenied => PositionError::PermissionDenied,
            _ => PositionError::Other(format!("reading {}: {err}", self.path.display())),
        })?;

        let fix: Fix = serde_json::from_str(&contents)
            .map_err(|err| PositionError::Other(format!("malformed fix file: {err}")))?;

        accept_fix(&fix, Utc::now().timestamp(), options)
    }
}

/// How far ahead of the local clock a fix may be stamped.
const MAX_CLOCK_SKEW_SECS: i64 = 2;

fn accept_fix(fix: &Fix, now: i64, options: &PositionOptions) -> Result<Coordinates, PositionError> {
    let ahead = fix.timestamp.saturating_sub(now);
    if ahead > MAX_CLOCK_SKEW_SECS {
        tracing::debug!(ahead, "Location fix is dated in the future");
        return Err(PositionError::PositionUnavailable);
    }

    let age = now.saturating_sub(fix.timestamp).max(0).unsigned_abs();
    if age > options.maximum_age.as_secs() {
        tracing::debug!(age, max_age = options.maximum_age.as_secs(), "Location fix too old");
        return Err(PositionError::PositionUnavailable);
    }

    Coordinates::new(fix.lat, fix.lon).map_err(|err| PositionError::Other(err.to_string()))
}
