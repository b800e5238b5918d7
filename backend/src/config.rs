//! Configuration management for the Aphid Risk service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides such as APHID__SERVER__PORT

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::WeatherFallback;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Trained model artifacts
    pub model: ModelConfig,

    /// Historical infestation baselines
    pub baseline: BaselineConfig,

    /// Geocoding API configuration
    pub geocoder: GeocoderConfig,

    /// Weather API configuration
    pub weather: WeatherConfig,

    /// Behaviour when live weather is unavailable
    pub fallback: FallbackConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Path to the tree-ensemble JSON artifact
    pub path: String,

    /// Path to the label encodings JSON; derived from the catalog when absent
    pub encodings_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BaselineConfig {
    /// Persisted baseline table; takes precedence over the seed
    pub path: Option<String>,

    /// Seed for regenerating the baseline table
    pub seed: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocoderConfig {
    /// Nominatim-compatible endpoint
    pub base_url: String,

    /// User agent sent with every request
    pub user_agent: String,

    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Weather API endpoint
    pub api_endpoint: String,

    /// Weather API key; live weather is disabled without one
    pub api_key: Option<String>,

    /// Per-call timeout in milliseconds
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FallbackConfig {
    pub mode: WeatherFallback,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("APHID_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Self::layered(&environment, "config", Environment::with_prefix("APHID"))
    }

    /// Defaults, then `{config_dir}/{environment}.toml`, then `env`
    fn layered(
        environment: &str,
        config_dir: &str,
        env: Environment,
    ) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment)?
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("model.path", "artifacts/aphid_risk_model.json")?
            .set_default("baseline.seed", 42)?
            .set_default("geocoder.base_url", "https://nominatim.openstreetmap.org")?
            .set_default("geocoder.user_agent", "aphid_risk_predictor")?
            .set_default("geocoder.timeout_ms", 5000)?
            .set_default("weather.api_endpoint", "https://api.openweathermap.org/data/2.5")?
            .set_default("weather.timeout_ms", 5000)?
            .set_default("fallback.mode", "synthetic")?
            // Load environment-specific config file
            .add_source(
                File::with_name(&format!("{}/{}", config_dir, environment)).required(false),
            )
            // Override with environment variables (APHID__SECTION__KEY)
            .add_source(env.separator("__").try_parsing(true))
            .build()?;

        config.try_deserialize()
    }

    /// Live weather lookups are only possible with an API key
    pub fn weather_api_key(&self) -> Option<&str> {
        self.weather
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            host: "0.0.0.0".to_string(),
        }
    }
}
