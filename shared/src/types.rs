//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// GPS coordinates in decimal degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Kinds of categorical value the predictor was trained on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Location,
    Climate,
    Crop,
}

impl std::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryKind::Location => write!(f, "location"),
            CategoryKind::Climate => write!(f, "climate"),
            CategoryKind::Crop => write!(f, "crop"),
        }
    }
}
