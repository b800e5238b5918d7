//! Error types for risk resolution

use thiserror::Error;

use crate::types::CategoryKind;

/// Failures of the risk resolution pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RiskError {
    #[error("Unknown {kind}: {name}")]
    UnknownCategory { kind: CategoryKind, name: String },

    #[error("No reference location available")]
    NoReferenceLocation,

    #[error("No climate data found for location: {0}")]
    MissingClimateData(String),

    #[error("Prediction failed: {0}")]
    PredictionFailed(String),
}

impl RiskError {
    pub fn unknown(kind: CategoryKind, name: impl Into<String>) -> Self {
        RiskError::UnknownCategory {
            kind,
            name: name.into(),
        }
    }
}

/// Failures while loading persisted artifacts (model, encodings, baselines)
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to read artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid artifact: {0}")]
    Invalid(String),
}

pub type RiskResult<T> = Result<T, RiskError>;
