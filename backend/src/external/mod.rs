//! External API integrations
//!
//! Upstream lookups are best effort: every call is bounded by a timeout and
//! any failure is absorbed by the caller, which falls back to reference or
//! synthetic data.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use shared::{GeoPoint, WeatherSample};
use thiserror::Error;

pub mod geocoder;
pub mod weather;

pub use geocoder::NominatimGeocoder;
pub use weather::OpenWeatherMapProvider;

/// Upstream collaborator failures. Never surfaced to API callers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UpstreamError {
    #[error("Upstream service unavailable: {0}")]
    Unavailable(String),

    #[error("Upstream call timed out after {0:?}")]
    Timeout(Duration),

    #[error("No result from upstream service")]
    NotFound,
}

/// Resolves a place name to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<GeoPoint, UpstreamError>;
}

/// Fetches current weather at a point
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch(&self, point: GeoPoint) -> Result<WeatherSample, UpstreamError>;
}

/// Bound an upstream call by `limit`
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, UpstreamError>
where
    F: Future<Output = Result<T, UpstreamError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| UpstreamError::Timeout(limit))?
}
