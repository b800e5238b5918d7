//! Aphid risk resolution core
//!
//! Resolves a queried location to reference data, sources weather (live or
//! synthetic), builds the fixed-order feature vector and scores it with a
//! pretrained regression predictor. Shared by the backend server and the
//! WASM dashboard helpers.

pub mod baseline;
pub mod catalog;
pub mod climate;
pub mod engine;
pub mod error;
pub mod features;
pub mod geo;
pub mod models;
pub mod predictor;
pub mod types;
pub mod validation;

pub use baseline::HistoricalBaseline;
pub use catalog::ReferenceCatalog;
pub use climate::ClimateWeatherModel;
pub use engine::{RiskAssessment, RiskEngine, RiskRequest, WeatherFallback};
pub use error::{ArtifactError, RiskError, RiskResult};
pub use features::{FeatureEncoder, FeatureVector, LabelEncodings, ResolvedLocation};
pub use geo::{haversine_km, GeoIndex, Neighbour};
pub use models::*;
pub use predictor::{Predictor, PredictorError, TreeEnsemble};
pub use types::*;
pub use validation::*;
