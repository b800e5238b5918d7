//! Aphid Risk Prediction Service - Backend
//!
//! Estimates aphid infestation risk for a location and crop from live or
//! synthetic weather and a pretrained regression model.

use std::{fs::File, io::BufReader, sync::Arc, time::Duration};

use anyhow::Context;
use axum::{routing::get, Router};
use shared::{HistoricalBaseline, LabelEncodings, ReferenceCatalog, RiskEngine, TreeEnsemble};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;

use external::{NominatimGeocoder, OpenWeatherMapProvider};
use services::RiskService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub risk: RiskService,
    pub config: Arc<Config>,
}

/// Load the read-only startup tables and the trained model
pub fn load_engine(config: &Config) -> anyhow::Result<RiskEngine> {
    let catalog = ReferenceCatalog::builtin();

    let baseline = match &config.baseline.path {
        Some(path) => {
            tracing::info!("Loading historical baselines from {}", path);
            let file = File::open(path).with_context(|| format!("opening baseline table {}", path))?;
            HistoricalBaseline::from_json(BufReader::new(file))
                .with_context(|| format!("reading baseline table {}", path))?
        }
        None => {
            tracing::info!("Generating historical baselines with seed {}", config.baseline.seed);
            HistoricalBaseline::seeded(&catalog, config.baseline.seed)
        }
    };

    let encodings = match &config.model.encodings_path {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening encodings {}", path))?;
            LabelEncodings::from_json(BufReader::new(file))
                .with_context(|| format!("reading encodings {}", path))?
        }
        None => LabelEncodings::from_catalog(&catalog),
    };

    tracing::info!("Loading model from {}", config.model.path);
    let file = File::open(&config.model.path)
        .with_context(|| format!("opening model {}", config.model.path))?;
    let model = TreeEnsemble::from_json(BufReader::new(file))
        .with_context(|| format!("reading model {}", config.model.path))?;
    tracing::info!("Model loaded with {} trees", model.trees.len());

    Ok(RiskEngine::new(
        Arc::new(catalog),
        Arc::new(baseline),
        Arc::new(encodings),
        Arc::new(model),
    )
    .with_fallback(config.fallback.mode))
}

/// Wire the engine to the configured upstream collaborators
pub fn build_state(config: Config, engine: RiskEngine) -> AppState {
    let geocoder = NominatimGeocoder::new(
        config.geocoder.base_url.clone(),
        &config.geocoder.user_agent,
        Duration::from_millis(config.geocoder.timeout_ms),
    );
    let mut risk = RiskService::new(Arc::new(engine)).with_geocoder(Arc::new(geocoder));

    match config.weather_api_key() {
        Some(api_key) => {
            let provider = OpenWeatherMapProvider::with_base_url(
                api_key.to_string(),
                config.weather.api_endpoint.clone(),
                Duration::from_millis(config.weather.timeout_ms),
            );
            risk = risk.with_weather_provider(Arc::new(provider));
        }
        None => tracing::warn!("Weather API key not configured, using climate estimates only"),
    }

    AppState {
        risk,
        config: Arc::new(config),
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .nest("/api", routes::legacy_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Aphid Risk Prediction API v1.0"
}
