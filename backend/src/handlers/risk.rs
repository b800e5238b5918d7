//! HTTP handlers for risk prediction endpoints

use axum::{extract::State, Json};
use shared::{CropProfile, Location};

use crate::error::AppResult;
use crate::services::risk::{PredictInput, PredictResponse};
use crate::AppState;

/// Predict aphid risk for a country and crop
pub async fn predict_risk(
    State(state): State<AppState>,
    Json(input): Json<PredictInput>,
) -> AppResult<Json<PredictResponse>> {
    let response = state.risk.predict(input).await?;
    Ok(Json(response))
}

/// List crops with their susceptibility factors
pub async fn list_crops(State(state): State<AppState>) -> Json<Vec<CropProfile>> {
    Json(state.risk.crops())
}

/// List reference locations
pub async fn list_locations(State(state): State<AppState>) -> Json<Vec<Location>> {
    Json(state.risk.locations())
}
