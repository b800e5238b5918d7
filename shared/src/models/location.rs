//! Reference location and crop models

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::RiskError;
use crate::types::{CategoryKind, GeoPoint};

/// Coarse climate classification driving synthetic weather ranges
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ClimateZone {
    Tropical,
    Temperate,
    Continental,
    Arid,
    Highland,
}

impl ClimateZone {
    pub const ALL: [ClimateZone; 5] = [
        ClimateZone::Tropical,
        ClimateZone::Temperate,
        ClimateZone::Continental,
        ClimateZone::Arid,
        ClimateZone::Highland,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ClimateZone::Tropical => "tropical",
            ClimateZone::Temperate => "temperate",
            ClimateZone::Continental => "continental",
            ClimateZone::Arid => "arid",
            ClimateZone::Highland => "highland",
        }
    }
}

impl std::fmt::Display for ClimateZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ClimateZone {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClimateZone::ALL
            .into_iter()
            .find(|zone| zone.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RiskError::unknown(CategoryKind::Climate, s))
    }
}

/// A named reference location (country centroid)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub climate_zone: ClimateZone,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64, zone: ClimateZone) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            climate_zone: zone,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Crop with its aphid susceptibility factor (0-1)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropProfile {
    pub name: String,
    pub susceptibility: f64,
}
