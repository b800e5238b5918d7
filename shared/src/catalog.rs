//! Reference catalog of known locations and crops
//!
//! Built once at startup and read-only afterwards; safe to share across
//! requests behind an `Arc` without locking.

use std::collections::HashMap;

use crate::error::{RiskError, RiskResult};
use crate::models::{ClimateZone, CropProfile, Location};

/// Susceptibility assumed for a crop missing from the table
pub const DEFAULT_SUSCEPTIBILITY: f64 = 0.5;

use ClimateZone::{Arid, Continental, Highland, Temperate, Tropical};

/// Country centroids the predictor was trained on, in training order
const REFERENCE_LOCATIONS: &[(&str, f64, f64, ClimateZone)] = &[
    ("USA", 39.5, -98.35, Temperate),
    ("Canada", 56.1, -106.3, Continental),
    ("Brazil", -14.2, -51.9, Tropical),
    ("Argentina", -38.4, -63.6, Temperate),
    ("Mexico", 23.6, -102.5, Arid),
    ("Chile", -35.7, -71.5, Temperate),
    ("Colombia", 4.6, -74.1, Highland),
    ("Peru", -9.2, -75.0, Highland),
    ("Venezuela", 6.4, -66.6, Highland),
    ("UK", 55.4, -3.4, Temperate),
    ("France", 46.2, 2.2, Temperate),
    ("Germany", 51.2, 10.4, Temperate),
    ("Italy", 41.9, 12.6, Temperate),
    ("Spain", 40.5, -3.7, Temperate),
    ("Portugal", 39.4, -8.2, Temperate),
    ("Netherlands", 52.1, 5.3, Temperate),
    ("Belgium", 50.8, 4.5, Temperate),
    ("Sweden", 60.1, 18.6, Continental),
    ("Norway", 60.5, 8.5, Continental),
    ("Finland", 64.0, 26.0, Continental),
    ("Poland", 51.9, 19.1, Temperate),
    ("Russia", 61.5, 105.3, Continental),
    ("Ukraine", 48.4, 31.2, Temperate),
    ("Turkey", 38.9, 35.2, Temperate),
    ("India", 20.6, 78.9, Tropical),
    ("China", 35.9, 104.2, Temperate),
    ("Japan", 36.2, 138.3, Temperate),
    ("South Korea", 36.5, 127.9, Temperate),
    ("Indonesia", -0.8, 113.9, Tropical),
    ("Thailand", 15.8, 101.0, Tropical),
    ("Vietnam", 14.1, 108.3, Tropical),
    ("Philippines", 12.9, 121.8, Tropical),
    ("Malaysia", 4.2, 101.9, Tropical),
    ("Australia", -25.3, 133.8, Temperate),
    ("New Zealand", -40.9, 174.9, Temperate),
    ("South Africa", -30.6, 22.9, Temperate),
    ("Egypt", 26.8, 30.8, Arid),
    ("Nigeria", 9.1, 8.7, Tropical),
    ("Kenya", 0.0, 37.9, Tropical),
    ("Ethiopia", 9.1, 40.5, Tropical),
    ("Ghana", 7.9, -1.0, Tropical),
    ("Morocco", 31.8, -7.1, Arid),
    ("Saudi Arabia", 23.9, 45.1, Arid),
    ("Iran", 32.4, 53.7, Arid),
    ("Pakistan", 30.4, 69.3, Arid),
    // Training data defaulted Bangladesh to temperate
    ("Bangladesh", 23.7, 90.4, Temperate),
    ("Nepal", 28.4, 84.1, Highland),
    ("Sri Lanka", 7.9, 80.8, Tropical),
];

const CROP_SUSCEPTIBILITY: &[(&str, f64)] = &[
    ("Wheat", 0.8),
    ("Rice", 0.6),
    ("Maize", 0.7),
    ("Soybean", 0.9),
    ("Cotton", 0.5),
    ("Potato", 0.4),
    ("Barley", 0.7),
    ("Sugarcane", 0.3),
];

/// Static registry of named reference locations and crop susceptibilities
#[derive(Debug, Clone)]
pub struct ReferenceCatalog {
    locations: Vec<Location>,
    by_name: HashMap<String, usize>,
    crops: Vec<CropProfile>,
}

impl ReferenceCatalog {
    /// Catalog with the built-in country and crop tables
    pub fn builtin() -> Self {
        let locations = REFERENCE_LOCATIONS
            .iter()
            .map(|&(name, lat, lon, zone)| Location::new(name, lat, lon, zone))
            .collect();
        let crops = CROP_SUSCEPTIBILITY
            .iter()
            .map(|&(name, susceptibility)| CropProfile {
                name: name.to_string(),
                susceptibility,
            })
            .collect();
        Self::new(locations, crops)
    }

    /// Build a catalog from explicit tables. Later duplicates of a name are ignored
    /// for lookup but keep their slot in insertion order.
    pub fn new(locations: Vec<Location>, crops: Vec<CropProfile>) -> Self {
        let mut by_name = HashMap::with_capacity(locations.len());
        for (idx, location) in locations.iter().enumerate() {
            by_name.entry(location.name.clone()).or_insert(idx);
        }
        Self {
            locations,
            by_name,
            crops,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Location> {
        self.by_name.get(name).map(|&idx| &self.locations[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn climate_of(&self, name: &str) -> RiskResult<ClimateZone> {
        self.lookup(name)
            .map(|location| location.climate_zone)
            .ok_or_else(|| RiskError::MissingClimateData(name.to_string()))
    }

    pub fn crop(&self, name: &str) -> Option<&CropProfile> {
        self.crops.iter().find(|crop| crop.name == name)
    }

    /// Susceptibility of a crop; unknown crops get [`DEFAULT_SUSCEPTIBILITY`]
    pub fn susceptibility_of(&self, crop: &str) -> f64 {
        self.crop(crop)
            .map(|profile| profile.susceptibility)
            .unwrap_or(DEFAULT_SUSCEPTIBILITY)
    }

    /// Locations in insertion order
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn crops(&self) -> &[CropProfile] {
        &self.crops
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl Default for ReferenceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
