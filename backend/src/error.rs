//! Error handling for the Aphid Risk service
//!
//! Provides consistent JSON error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::RiskError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Could not find coordinates for location: {0}")]
    LocationUnresolved(String),

    // Risk pipeline errors
    #[error(transparent)]
    Risk(#[from] RiskError),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field = errors
            .field_errors()
            .keys()
            .next()
            .map(|f| f.to_string())
            .unwrap_or_default();
        AppError::Validation {
            field,
            message: errors.to_string(),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    fn status_and_detail(&self) -> (StatusCode, ErrorDetail) {
        match self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::LocationUnresolved(_) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "LOCATION_UNRESOLVED".to_string(),
                    message: self.to_string(),
                    field: Some("country".to_string()),
                },
            ),
            AppError::Risk(RiskError::UnknownCategory { kind, .. }) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "UNKNOWN_CATEGORY".to_string(),
                    message: self.to_string(),
                    field: Some(kind.to_string()),
                },
            ),
            AppError::Risk(RiskError::NoReferenceLocation)
            | AppError::Risk(RiskError::MissingClimateData(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CATALOG_ERROR".to_string(),
                    message: self.to_string(),
                    field: None,
                },
            ),
            AppError::Risk(RiskError::PredictionFailed(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "PREDICTION_FAILED".to_string(),
                    message: self.to_string(),
                    field: None,
                },
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = self.status_and_detail();

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shared::CategoryKind;

    #[test]
    fn test_unknown_crop_is_bad_request() {
        let err = AppError::from(RiskError::unknown(CategoryKind::Crop, "Durian"));
        let (status, detail) = err.status_and_detail();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail.code, "UNKNOWN_CATEGORY");
        assert_eq!(detail.field.as_deref(), Some("crop"));
        assert_eq!(detail.message, "Unknown crop: Durian");
    }

    #[test]
    fn test_prediction_failure_is_server_error() {
        let err = AppError::from(RiskError::PredictionFailed("boom".to_string()));
        let (status, detail) = err.status_and_detail();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(detail.code, "PREDICTION_FAILED");
    }

    #[test]
    fn test_catalog_errors_are_server_errors() {
        for err in [
            RiskError::NoReferenceLocation,
            RiskError::MissingClimateData("X".to_string()),
        ] {
            let (status, detail) = AppError::from(err).status_and_detail();
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(detail.code, "CATALOG_ERROR");
        }
    }

    #[test]
    fn test_unresolved_location_is_bad_request() {
        let (status, detail) = AppError::LocationUnresolved("Atlantis".to_string()).status_and_detail();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(detail.code, "LOCATION_UNRESOLVED");
    }
}
