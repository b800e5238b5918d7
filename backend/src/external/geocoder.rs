//! Geocoding client
//!
//! Resolves place names through a Nominatim-compatible search API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::GeoPoint;

use super::{with_timeout, Geocoder, UpstreamError};

/// Nominatim search client
#[derive(Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    timeout: Duration,
}

/// One search hit; Nominatim returns coordinates as strings
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: String, user_agent: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url,
            timeout,
        }
    }

    async fn search(&self, name: &str) -> Result<GeoPoint, UpstreamError> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(&[("q", name), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| UpstreamError::Unavailable(format!("Geocoding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(UpstreamError::Unavailable(format!(
                "Geocoding API error: {}",
                response.status()
            )));
        }

        let places: Vec<NominatimPlace> = response.json().await.map_err(|e| {
            UpstreamError::Unavailable(format!("Failed to parse geocoding response: {}", e))
        })?;

        parse_first_place(places)
    }
}

fn parse_first_place(places: Vec<NominatimPlace>) -> Result<GeoPoint, UpstreamError> {
    let place = places.into_iter().next().ok_or(UpstreamError::NotFound)?;
    let latitude = place
        .lat
        .parse::<f64>()
        .map_err(|e| UpstreamError::Unavailable(format!("Invalid latitude {}: {}", place.lat, e)))?;
    let longitude = place
        .lon
        .parse::<f64>()
        .map_err(|e| UpstreamError::Unavailable(format!("Invalid longitude {}: {}", place.lon, e)))?;
    Ok(GeoPoint::new(latitude, longitude))
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, name: &str) -> Result<GeoPoint, UpstreamError> {
        with_timeout(self.timeout, self.search(name)).await
    }
}
