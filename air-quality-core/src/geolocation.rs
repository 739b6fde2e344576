//! Device position acquisition with a single relaxed fallback attempt.

use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};
use thiserror::Error;

use crate::{error::AirQualityError, model::Coordinates};

mod fix_file;

pub use fix_file::FixFileSource;

/// How a single position request may be satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    /// Upper bound on how long the attempt may take; enforced by the caller of the source.
    pub timeout: Duration,
    /// Oldest cached fix that may be returned. Zero means a fresh fix only.
    pub maximum_age: Duration,
}

impl PositionOptions {
    pub const PRECISE: Self = Self {
        enable_high_accuracy: true,
        timeout: Duration::from_secs(10),
        maximum_age: Duration::ZERO,
    };

    pub const FALLBACK: Self = Self {
        enable_high_accuracy: false,
        timeout: Duration::from_secs(20),
        maximum_age: Duration::from_secs(5 * 60),
    };
}

/// Why a single position attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    PositionUnavailable,

    #[error("timed out")]
    Timeout,

    #[error("{0}")]
    Other(String),
}

impl From<PositionError> for AirQualityError {
    fn from(err: PositionError) -> Self {
        match err {
            PositionError::PermissionDenied => AirQualityError::PermissionDenied,
            PositionError::PositionUnavailable => AirQualityError::PositionUnavailable,
            PositionError::Timeout => AirQualityError::Timeout,
            PositionError::Other(msg) => AirQualityError::Unknown(msg),
        }
    }
}

/// A platform location capability.
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, PositionError>;
}

async fn attempt(
    source: &dyn LocationSource,
    options: &PositionOptions,
) -> Result<Coordinates, PositionError> {
    tokio::time::timeout(options.timeout, source.current_position(options))
        .await
        .unwrap_or(Err(PositionError::Timeout))
}

/// Current device position.
///
/// Tries [`PositionOptions::PRECISE`] first and, on any failure, retries once
/// with [`PositionOptions::FALLBACK`]. The fallback's failure decides the
/// error kind. `None` means the platform has no location capability.
pub async fn device_location(
    source: Option<&dyn LocationSource>,
) -> Result<Coordinates, AirQualityError> {
    let Some(source) = source else {
        return Err(AirQualityError::Unsupported);
    };

    match attempt(source, &PositionOptions::PRECISE).await {
        Ok(coords) => {
            tracing::info!(%coords, "Acquired precise device location");
            return Ok(coords);
        }
        Err(err) => {
            tracing::debug!(error = %err, "Precise location attempt failed; retrying with relaxed options");
        }
    }

    match attempt(source, &PositionOptions::FALLBACK).await {
        Ok(coords) => {
            tracing::info!(%coords, "Acquired device location on fallback attempt");
            Ok(coords)
        }
        Err(err) => {
            tracing::warn!(error = %err, "Fallback location attempt failed");
            Err(err.into())
        }
    }
}
