//! Feature vector assembly for the risk predictor
//!
//! The field order of [`FeatureVector`] is the order the predictor was trained
//! with. Reordering it silently corrupts predictions.

use std::collections::HashSet;
use std::io::Read;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::baseline::HistoricalBaseline;
use crate::catalog::ReferenceCatalog;
use crate::error::{ArtifactError, RiskError, RiskResult};
use crate::geo::{GeoIndex, DEFAULT_NEIGHBOURS};
use crate::models::{ClimateZone, Location, WeatherSample};
use crate::types::{CategoryKind, GeoPoint};

/// Column names in training order
pub const FEATURE_NAMES: [&str; FeatureVector::LEN] = [
    "temperature",
    "humidity",
    "rainfall",
    "wind_speed",
    "month",
    "historical_infestation",
    "country_encoded",
    "climate_encoded",
    "crop_encoded",
];

/// Numeric model input, in training column order
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
    pub wind_speed: f64,
    pub month: f64,
    pub historical_infestation: f64,
    pub location_code: f64,
    pub climate_code: f64,
    pub crop_code: f64,
}

impl FeatureVector {
    pub const LEN: usize = 9;

    pub fn to_array(&self) -> [f64; Self::LEN] {
        [
            self.temperature,
            self.humidity,
            self.rainfall,
            self.wind_speed,
            self.month,
            self.historical_infestation,
            self.location_code,
            self.climate_code,
            self.crop_code,
        ]
    }
}

/// Integer codes for categorical columns, fixed at training time.
///
/// Codes follow label-encoder semantics: the code of a name is its index in
/// the lexicographically sorted class list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncodings {
    pub locations: Vec<String>,
    pub climates: Vec<String>,
    pub crops: Vec<String>,
}

impl LabelEncodings {
    /// Encodings equivalent to fitting label encoders on the catalog tables
    pub fn from_catalog(catalog: &ReferenceCatalog) -> Self {
        let locations = sorted_unique(catalog.locations().iter().map(|l| l.name.clone()));
        let climates = sorted_unique(
            catalog
                .locations()
                .iter()
                .map(|l| l.climate_zone.name().to_string()),
        );
        let crops = sorted_unique(catalog.crops().iter().map(|c| c.name.clone()));

        Self {
            locations,
            climates,
            crops,
        }
    }

    pub fn from_json<R: Read>(reader: R) -> Result<Self, ArtifactError> {
        let encodings: LabelEncodings = serde_json::from_reader(reader)?;
        for (kind, classes) in [
            (CategoryKind::Location, &encodings.locations),
            (CategoryKind::Climate, &encodings.climates),
            (CategoryKind::Crop, &encodings.crops),
        ] {
            let unique: HashSet<&String> = classes.iter().collect();
            if unique.len() != classes.len() {
                return Err(ArtifactError::Invalid(format!(
                    "duplicate {} classes in encodings",
                    kind
                )));
            }
        }
        Ok(encodings)
    }

    fn classes(&self, kind: CategoryKind) -> &[String] {
        match kind {
            CategoryKind::Location => &self.locations,
            CategoryKind::Climate => &self.climates,
            CategoryKind::Crop => &self.crops,
        }
    }

    pub fn code_of(&self, kind: CategoryKind, name: &str) -> RiskResult<usize> {
        self.classes(kind)
            .iter()
            .position(|class| class == name)
            .ok_or_else(|| RiskError::unknown(kind, name))
    }

    pub fn contains(&self, kind: CategoryKind, name: &str) -> bool {
        self.classes(kind).iter().any(|class| class == name)
    }
}

fn sorted_unique(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut names: Vec<String> = names.collect();
    names.sort();
    names.dedup();
    names
}

/// Neighbour summary kept for the response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyReference {
    pub name: String,
    pub distance_km: f64,
}

/// Outcome of matching a queried location against the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLocation {
    /// Name the caller asked for
    pub query: String,
    /// Reference whose code and climate are used
    pub reference: Location,
    pub climate: ClimateZone,
    /// Baseline fed to the model; the k-neighbour mean on the fallback path
    pub historical_baseline: f64,
    /// Empty when the query matched a reference exactly
    pub nearest: Vec<NearbyReference>,
}

impl ResolvedLocation {
    pub fn used_nearest_neighbours(&self) -> bool {
        !self.nearest.is_empty()
    }
}

/// Maps resolved inputs to the predictor's feature vector
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    catalog: Arc<ReferenceCatalog>,
    baseline: Arc<HistoricalBaseline>,
    encodings: Arc<LabelEncodings>,
    neighbours: usize,
}

impl FeatureEncoder {
    pub fn new(
        catalog: Arc<ReferenceCatalog>,
        baseline: Arc<HistoricalBaseline>,
        encodings: Arc<LabelEncodings>,
    ) -> Self {
        Self {
            catalog,
            baseline,
            encodings,
            neighbours: DEFAULT_NEIGHBOURS,
        }
    }

    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    pub fn encodings(&self) -> &LabelEncodings {
        &self.encodings
    }

    /// Resolve `name` to reference data.
    ///
    /// An exact catalog match uses its own climate and baseline. Otherwise
    /// climate and code come from the single nearest reference to `point`,
    /// while the baseline is the mean over the k nearest references.
    pub fn resolve(&self, name: &str, point: GeoPoint) -> RiskResult<ResolvedLocation> {
        if let Some(location) = self.catalog.lookup(name) {
            let climate = self.catalog.climate_of(name)?;
            return Ok(ResolvedLocation {
                query: name.to_string(),
                reference: location.clone(),
                climate,
                historical_baseline: self.baseline.get(name),
                nearest: Vec::new(),
            });
        }

        let neighbours = GeoIndex::new(&self.catalog).nearest(point, self.neighbours)?;
        let closest = neighbours.first().ok_or(RiskError::NoReferenceLocation)?;
        let climate = self.catalog.climate_of(&closest.location.name)?;

        let names: Vec<&str> = neighbours
            .iter()
            .map(|n| n.location.name.as_str())
            .collect();
        let historical_baseline = self.baseline.mean_of(&names);

        tracing::warn!(
            location = %name,
            closest = %closest.location.name,
            distance_km = closest.distance_km,
            neighbours = ?names,
            "Location not in reference catalog, using nearest neighbours"
        );

        Ok(ResolvedLocation {
            query: name.to_string(),
            reference: closest.location.clone(),
            climate,
            historical_baseline,
            nearest: neighbours
                .iter()
                .map(|n| NearbyReference {
                    name: n.location.name.clone(),
                    distance_km: n.distance_km,
                })
                .collect(),
        })
    }

    /// Build the feature vector. Every categorical code is resolved before the
    /// vector is assembled, so a failure never yields a partial vector.
    pub fn encode(
        &self,
        resolved: &ResolvedLocation,
        crop: &str,
        weather: &WeatherSample,
        month: u32,
    ) -> RiskResult<FeatureVector> {
        let crop_code = self.encodings.code_of(CategoryKind::Crop, crop)?;
        let climate_code = self
            .encodings
            .code_of(CategoryKind::Climate, resolved.climate.name())?;
        let location_code = self
            .encodings
            .code_of(CategoryKind::Location, &resolved.reference.name)?;

        Ok(FeatureVector {
            temperature: weather.temperature,
            humidity: weather.humidity,
            rainfall: weather.rainfall,
            wind_speed: weather.wind_speed,
            month: month as f64,
            historical_infestation: resolved.historical_baseline,
            location_code: location_code as f64,
            climate_code: climate_code as f64,
            crop_code: crop_code as f64,
        })
    }

    /// Fail fast on a crop the predictor was never trained on
    pub fn check_crop(&self, crop: &str) -> RiskResult<()> {
        self.encodings.code_of(CategoryKind::Crop, crop).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> FeatureEncoder {
        let catalog = Arc::new(ReferenceCatalog::builtin());
        let baseline = Arc::new(HistoricalBaseline::seeded(&catalog, 42));
        let encodings = Arc::new(LabelEncodings::from_catalog(&catalog));
        FeatureEncoder::new(catalog, baseline, encodings)
    }

    fn weather() -> WeatherSample {
        WeatherSample::live(22.0, 70.0, 5.0, 5.0)
    }

    #[test]
    fn test_encodings_are_sorted() {
        let encodings = LabelEncodings::from_catalog(&ReferenceCatalog::builtin());
        assert_eq!(encodings.locations.len(), 48);
        assert_eq!(encodings.locations[0], "Argentina");
        assert_eq!(
            encodings.climates,
            vec!["arid", "continental", "highland", "temperate", "tropical"]
        );
        assert_eq!(encodings.code_of(CategoryKind::Crop, "Barley").unwrap(), 0);
        assert_eq!(encodings.code_of(CategoryKind::Crop, "Wheat").unwrap(), 7);
    }

    #[test]
    fn test_resolve_exact_match() {
        let encoder = encoder();
        let resolved = encoder.resolve("USA", GeoPoint::new(0.0, 0.0)).unwrap();
        assert_eq!(resolved.reference.name, "USA");
        assert_eq!(resolved.climate, ClimateZone::Temperate);
        assert!(!resolved.used_nearest_neighbours());
    }

    #[test]
    fn test_resolve_unknown_uses_nearest() {
        let encoder = encoder();
        let resolved = encoder.resolve("Togo", GeoPoint::new(10.0, 10.0)).unwrap();
        assert_eq!(resolved.nearest.len(), DEFAULT_NEIGHBOURS);
        assert_eq!(resolved.reference.name, resolved.nearest[0].name);
        assert_eq!(resolved.climate, ClimateZone::Tropical);
    }

    #[test]
    fn test_encode_field_order() {
        let encoder = encoder();
        let resolved = encoder.resolve("USA", GeoPoint::new(39.5, -98.35)).unwrap();
        let vector = encoder.encode(&resolved, "Wheat", &weather(), 5).unwrap();
        let array = vector.to_array();
        assert_eq!(&array[..5], &[22.0, 70.0, 5.0, 5.0, 5.0]);
        assert_eq!(array[5], resolved.historical_baseline);
        let encodings = encoder.encodings();
        assert_eq!(
            array[6],
            encodings.code_of(CategoryKind::Location, "USA").unwrap() as f64
        );
        assert_eq!(
            array[7],
            encodings.code_of(CategoryKind::Climate, "temperate").unwrap() as f64
        );
        assert_eq!(array[8], 7.0);
    }

    #[test]
    fn test_encode_unknown_crop_fails() {
        let encoder = encoder();
        let resolved = encoder.resolve("USA", GeoPoint::new(39.5, -98.35)).unwrap();
        let err = encoder.encode(&resolved, "Durian", &weather(), 5).unwrap_err();
        assert_eq!(err, RiskError::unknown(CategoryKind::Crop, "Durian"));
    }

    #[test]
    fn test_encode_unknown_climate_fails() {
        let catalog = Arc::new(ReferenceCatalog::builtin());
        let baseline = Arc::new(HistoricalBaseline::seeded(&catalog, 42));
        let mut encodings = LabelEncodings::from_catalog(&catalog);
        encodings.climates.retain(|c| c != "highland");
        let encoder = FeatureEncoder::new(catalog, baseline, Arc::new(encodings));

        let resolved = encoder.resolve("Nepal", GeoPoint::new(28.4, 84.1)).unwrap();
        let err = encoder.encode(&resolved, "Rice", &weather(), 1).unwrap_err();
        assert_eq!(err, RiskError::unknown(CategoryKind::Climate, "highland"));
    }

    #[test]
    fn test_encodings_reject_duplicates() {
        let json = r#"{"locations":["A","A"],"climates":[],"crops":[]}"#;
        assert!(LabelEncodings::from_json(json.as_bytes()).is_err());
    }

    #[test]
    fn test_feature_names_match_len() {
        assert_eq!(FEATURE_NAMES.len(), FeatureVector::LEN);
    }
}
