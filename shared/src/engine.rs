//! Risk resolution pipeline
//!
//! resolve location → resolve weather → encode → predict → clamp.
//! The engine holds only read-only startup tables and is shared freely across
//! concurrent requests.

use std::sync::Arc;

use chrono::Datelike;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::baseline::HistoricalBaseline;
use crate::catalog::ReferenceCatalog;
use crate::climate::{normalize_month, ClimateWeatherModel};
use crate::error::{RiskError, RiskResult};
use crate::features::{FeatureEncoder, FeatureVector, LabelEncodings, ResolvedLocation};
use crate::models::{RiskScore, WeatherSample};
use crate::predictor::Predictor;
use crate::types::GeoPoint;

/// How weather is produced when none was supplied
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeatherFallback {
    /// Random draw from the zone distributions
    #[default]
    Synthetic,
    /// Midpoint of the zone distributions
    Typical,
}

/// One risk query
#[derive(Debug, Clone, PartialEq)]
pub struct RiskRequest {
    pub location: String,
    pub point: GeoPoint,
    pub crop: String,
    /// Live weather, if any was obtained
    pub weather: Option<WeatherSample>,
}

/// Score plus the inputs that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub score: RiskScore,
    pub location: ResolvedLocation,
    pub crop: String,
    pub crop_susceptibility: f64,
    pub weather: WeatherSample,
    pub month: u32,
    pub features: FeatureVector,
}

/// Orchestrates resolution, weather sourcing, encoding and prediction
#[derive(Clone)]
pub struct RiskEngine {
    encoder: FeatureEncoder,
    weather_model: ClimateWeatherModel,
    predictor: Arc<dyn Predictor>,
    fallback: WeatherFallback,
}

impl RiskEngine {
    pub fn new(
        catalog: Arc<ReferenceCatalog>,
        baseline: Arc<HistoricalBaseline>,
        encodings: Arc<LabelEncodings>,
        predictor: Arc<dyn Predictor>,
    ) -> Self {
        Self {
            encoder: FeatureEncoder::new(catalog, baseline, encodings),
            weather_model: ClimateWeatherModel::new(),
            predictor,
            fallback: WeatherFallback::default(),
        }
    }

    pub fn with_fallback(mut self, fallback: WeatherFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn catalog(&self) -> &ReferenceCatalog {
        self.encoder.catalog()
    }

    pub fn fallback(&self) -> WeatherFallback {
        self.fallback
    }

    /// Score a request for the current calendar month
    pub fn predict(&self, request: &RiskRequest) -> RiskResult<RiskAssessment> {
        let month = chrono::Local::now().month();
        self.predict_at(request, month, &mut rand::thread_rng())
    }

    /// Score a request for `month`, drawing any synthetic weather from `rng`
    pub fn predict_at<R: Rng + ?Sized>(
        &self,
        request: &RiskRequest,
        month: u32,
        rng: &mut R,
    ) -> RiskResult<RiskAssessment> {
        let month = normalize_month(month);

        // Crop has no neighbour fallback
        self.encoder.check_crop(&request.crop)?;

        let resolved = self.encoder.resolve(&request.location, request.point)?;

        let weather = match request.weather {
            Some(weather) => weather,
            None => {
                let weather = match self.fallback {
                    WeatherFallback::Synthetic => {
                        self.weather_model.sample(resolved.climate, month, rng)
                    }
                    WeatherFallback::Typical => self.weather_model.typical(resolved.climate, month),
                };
                tracing::info!(
                    climate = %resolved.climate,
                    month,
                    source = ?weather.source,
                    "No live weather, using climate estimate"
                );
                weather
            }
        };

        let features = self
            .encoder
            .encode(&resolved, &request.crop, &weather, month)?;

        let raw = self
            .predictor
            .predict(&features)
            .map_err(|e| RiskError::PredictionFailed(e.to_string()))?;
        let score = RiskScore::clamped(raw);

        tracing::debug!(
            location = %resolved.reference.name,
            crop = %request.crop,
            raw,
            score = score.value(),
            "Risk predicted"
        );

        Ok(RiskAssessment {
            score,
            crop_susceptibility: self.catalog().susceptibility_of(&request.crop),
            location: resolved,
            crop: request.crop.clone(),
            weather,
            month,
            features,
        })
    }
}

impl std::fmt::Debug for RiskEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskEngine")
            .field("locations", &self.catalog().len())
            .field("fallback", &self.fallback)
            .finish()
    }
}
