//! Route definitions for the Aphid Risk service

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/predict", post(handlers::predict_risk))
        .route("/crops", get(handlers::list_crops))
        .route("/locations", get(handlers::list_locations))
}

/// Unversioned routes still called by the dashboard
pub fn legacy_routes() -> Router<AppState> {
    Router::new().route("/predict", post(handlers::predict_risk))
}
