//! Historical infestation baselines per reference location
//!
//! Baselines must match the values the predictor saw at training time, so they
//! are either loaded from the persisted table or regenerated from a fixed seed.

use std::collections::HashMap;
use std::io::Read;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::catalog::ReferenceCatalog;
use crate::climate::Span;
use crate::error::ArtifactError;
use crate::models::ClimateZone;

/// Baseline assumed for a location missing from the table
pub const DEFAULT_BASELINE: f64 = 0.3;

/// Default seed used when no persisted table is configured
pub const DEFAULT_BASELINE_SEED: u64 = 42;

/// Range a zone's baseline is drawn from
pub fn baseline_span(zone: ClimateZone) -> Span {
    match zone {
        ClimateZone::Tropical => Span::new(0.4, 0.8),
        ClimateZone::Arid => Span::new(0.1, 0.4),
        ClimateZone::Continental => Span::new(0.3, 0.6),
        ClimateZone::Highland => Span::new(0.2, 0.5),
        ClimateZone::Temperate => Span::new(0.2, 0.6),
    }
}

/// Location name → assumed historical infestation propensity in [0, 1]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct HistoricalBaseline {
    values: HashMap<String, f64>,
}

impl HistoricalBaseline {
    /// One draw per catalog location, in catalog order, from a seeded generator
    pub fn seeded(catalog: &ReferenceCatalog, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::generate(catalog, &mut rng)
    }

    pub fn generate<R: Rng + ?Sized>(catalog: &ReferenceCatalog, rng: &mut R) -> Self {
        let values = catalog
            .locations()
            .iter()
            .map(|location| {
                let value = baseline_span(location.climate_zone).sample(rng);
                (location.name.clone(), value)
            })
            .collect();
        Self { values }
    }

    /// Load a persisted `{ "name": value }` table
    pub fn from_json<R: Read>(reader: R) -> Result<Self, ArtifactError> {
        let values: HashMap<String, f64> = serde_json::from_reader(reader)?;
        Self::from_values(values)
    }

    pub fn from_values(values: HashMap<String, f64>) -> Result<Self, ArtifactError> {
        if let Some((name, value)) = values
            .iter()
            .find(|(_, v)| !(0.0..=1.0).contains(*v))
        {
            return Err(ArtifactError::Invalid(format!(
                "baseline for {} is {}, expected a value in [0, 1]",
                name, value
            )));
        }
        Ok(Self { values })
    }

    /// Baseline for `name`, or [`DEFAULT_BASELINE`] when absent
    pub fn get(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(DEFAULT_BASELINE)
    }

    /// Mean baseline over `names`; [`DEFAULT_BASELINE`] for an empty slice
    pub fn mean_of<S: AsRef<str>>(&self, names: &[S]) -> f64 {
        if names.is_empty() {
            return DEFAULT_BASELINE;
        }
        let total: f64 = names.iter().map(|name| self.get(name.as_ref())).sum();
        total / names.len() as f64
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Persisted form of the table
    pub fn to_json(&self) -> Result<String, ArtifactError> {
        Ok(serde_json::to_string_pretty(&self.values)?)
    }
}
