//! Weather API client for fetching weather data
//!
//! Integrates with OpenWeatherMap API for current conditions

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{GeoPoint, WeatherSample};

use super::{with_timeout, UpstreamError, WeatherProvider};

/// OpenWeatherMap current-conditions client
#[derive(Clone)]
pub struct OpenWeatherMapProvider {
    client: Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

/// OpenWeatherMap API response for current weather
#[derive(Debug, Deserialize)]
struct OWMCurrentResponse {
    #[serde(default)]
    weather: Vec<OWMWeather>,
    main: OWMMain,
    wind: OWMWind,
    rain: Option<OWMRain>,
}

#[derive(Debug, Deserialize)]
struct OWMWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OWMWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OWMRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
}

impl OpenWeatherMapProvider {
    /// Create a new client against the public API
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self::with_base_url(
            api_key,
            "https://api.openweathermap.org/data/2.5".to_string(),
            timeout,
        )
    }

    /// Create a new client with custom base URL (for testing)
    pub fn with_base_url(api_key: String, base_url: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key,
            base_url,
            timeout,
        }
    }

    async fn get_current_weather(&self, point: GeoPoint) -> Result<WeatherSample, UpstreamError> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=metric",
            self.base_url, point.latitude, point.longitude, self.api_key
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| UpstreamError::Unavailable(format!("Weather API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Unavailable(format!(
                "Weather API error: {} - {}",
                status, body
            )));
        }

        let data: OWMCurrentResponse = response.json().await.map_err(|e| {
            UpstreamError::Unavailable(format!("Failed to parse weather response: {}", e))
        })?;

        let description = data.weather.first().map(|w| w.description.as_str()).unwrap_or("");
        tracing::debug!(%description, "Fetched live weather");

        Ok(convert_current_response(data))
    }
}

/// Convert OpenWeatherMap current response to our format
fn convert_current_response(data: OWMCurrentResponse) -> WeatherSample {
    let rainfall = data.rain.and_then(|r| r.one_hour).unwrap_or(0.0);
    WeatherSample::live(data.main.temp, data.main.humidity, rainfall, data.wind.speed)
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapProvider {
    async fn fetch(&self, point: GeoPoint) -> Result<WeatherSample, UpstreamError> {
        with_timeout(self.timeout, self.get_current_weather(point)).await
    }
}
