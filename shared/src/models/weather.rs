//! Weather data models

use serde::{Deserialize, Serialize};

/// Where a weather sample came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherSource {
    /// Observed by an upstream provider or supplied by the caller
    #[default]
    Live,
    /// Drawn from the climate-zone distributions
    Synthetic,
    /// Deterministic typical conditions for the climate zone
    Default,
}

impl std::fmt::Display for WeatherSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherSource::Live => write!(f, "live"),
            WeatherSource::Synthetic => write!(f, "synthetic"),
            WeatherSource::Default => write!(f, "default"),
        }
    }
}

/// Weather conditions used as model input
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeatherSample {
    /// Air temperature in °C
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Rainfall in mm
    pub rainfall: f64,
    /// Wind speed in m/s
    pub wind_speed: f64,
    #[serde(default)]
    pub source: WeatherSource,
}

impl WeatherSample {
    pub fn live(temperature: f64, humidity: f64, rainfall: f64, wind_speed: f64) -> Self {
        Self {
            temperature,
            humidity,
            rainfall,
            wind_speed,
            source: WeatherSource::Live,
        }
    }

    pub fn with_source(mut self, source: WeatherSource) -> Self {
        self.source = source;
        self
    }
}
