//! Risk assessment service
//!
//! Glues the request surface to the risk engine: resolves coordinates and live
//! weather through upstream collaborators, falling back to reference data and
//! synthetic weather when they fail, then scores the request.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{
    recommended_actions, validate_coordinates, validate_location_name, validate_weather,
    CropProfile, GeoPoint, Location, RiskAssessment, RiskEngine, RiskLevel, RiskRequest,
    WeatherSample, WeatherSource,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::external::{Geocoder, WeatherProvider};

/// Risk service shared by all handlers
#[derive(Clone)]
pub struct RiskService {
    engine: Arc<RiskEngine>,
    geocoder: Option<Arc<dyn Geocoder>>,
    weather: Option<Arc<dyn WeatherProvider>>,
}

/// Caller-supplied weather observation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeatherInput {
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
    pub wind_speed: f64,
}

impl From<WeatherInput> for WeatherSample {
    fn from(w: WeatherInput) -> Self {
        WeatherSample::live(w.temperature, w.humidity, w.rainfall, w.wind_speed)
    }
}

/// Input for a risk prediction
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PredictInput {
    #[validate(length(min = 1, message = "Country name is required and must be valid"))]
    pub country: String,
    #[validate(length(min = 1, message = "Crop is required"))]
    pub crop: String,
    pub coordinates: Option<GeoPoint>,
    pub weather: Option<WeatherInput>,
}

/// Reference location near the query
#[derive(Debug, Clone, Serialize)]
pub struct NearbyLocation {
    pub name: String,
    pub distance_km: f64,
}

/// Prediction response
#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub assessment_id: Uuid,
    pub risk: f64,
    pub risk_level: RiskLevel,
    pub message: String,
    pub recommendations: Vec<String>,
    pub country: String,
    pub resolved_location: String,
    pub used_nearest_neighbours: bool,
    pub nearest: Vec<NearbyLocation>,
    pub crop: String,
    pub crop_susceptibility: f64,
    pub coordinates: GeoPoint,
    pub weather: WeatherSample,
    pub weather_source: WeatherSource,
    pub month: u32,
}

impl PredictResponse {
    fn from_assessment(country: String, coordinates: GeoPoint, assessment: RiskAssessment) -> Self {
        let level = assessment.score.level();
        Self {
            assessment_id: Uuid::new_v4(),
            risk: assessment.score.rounded(),
            risk_level: level,
            message: level.message().to_string(),
            recommendations: recommended_actions(assessment.score.value())
                .into_iter()
                .map(str::to_string)
                .collect(),
            country,
            resolved_location: assessment.location.reference.name.clone(),
            used_nearest_neighbours: assessment.location.used_nearest_neighbours(),
            nearest: assessment
                .location
                .nearest
                .iter()
                .map(|n| NearbyLocation {
                    name: n.name.clone(),
                    distance_km: n.distance_km,
                })
                .collect(),
            crop: assessment.crop,
            crop_susceptibility: assessment.crop_susceptibility,
            coordinates,
            weather_source: assessment.weather.source,
            weather: assessment.weather,
            month: assessment.month,
        }
    }
}

impl RiskService {
    /// Create a new RiskService with no upstream collaborators
    pub fn new(engine: Arc<RiskEngine>) -> Self {
        Self {
            engine,
            geocoder: None,
            weather: None,
        }
    }

    pub fn with_geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn with_weather_provider(mut self, provider: Arc<dyn WeatherProvider>) -> Self {
        self.weather = Some(provider);
        self
    }

    pub fn engine(&self) -> &RiskEngine {
        &self.engine
    }

    /// Predict aphid risk for a country and crop
    pub async fn predict(&self, input: PredictInput) -> AppResult<PredictResponse> {
        input.validate()?;
        validate_location_name(&input.country).map_err(|msg| AppError::validation("country", msg))?;
        if let Some(point) = &input.coordinates {
            validate_coordinates(point).map_err(|msg| AppError::validation("coordinates", msg))?;
        }
        let supplied_weather = input.weather.map(WeatherSample::from);
        if let Some(weather) = &supplied_weather {
            validate_weather(weather).map_err(|msg| AppError::validation("weather", msg))?;
        }

        let country = input.country.trim().to_string();
        let point = self.resolve_coordinates(&country, input.coordinates).await?;

        let weather = match supplied_weather {
            Some(weather) => Some(weather),
            None => self.fetch_weather(point).await,
        };

        let request = RiskRequest {
            location: country.clone(),
            point,
            crop: input.crop.trim().to_string(),
            weather,
        };
        let assessment = self.engine.predict(&request)?;

        tracing::info!(
            country = %country,
            resolved = %assessment.location.reference.name,
            crop = %assessment.crop,
            risk = assessment.score.value(),
            weather_source = ?assessment.weather.source,
            "Aphid risk assessed"
        );

        Ok(PredictResponse::from_assessment(country, point, assessment))
    }

    /// Request coordinates, then the geocoder, then the catalog centroid
    async fn resolve_coordinates(
        &self,
        country: &str,
        supplied: Option<GeoPoint>,
    ) -> AppResult<GeoPoint> {
        if let Some(point) = supplied {
            return Ok(point);
        }

        if let Some(geocoder) = &self.geocoder {
            match geocoder.resolve(country).await {
                Ok(point) => {
                    tracing::debug!(country, lat = point.latitude, lon = point.longitude, "Geocoded");
                    return Ok(point);
                }
                Err(e) => tracing::warn!(country, error = %e, "Geocoding failed"),
            }
        }

        self.engine
            .catalog()
            .lookup(country)
            .map(Location::point)
            .ok_or_else(|| AppError::LocationUnresolved(country.to_string()))
    }

    /// Live weather if a provider is configured and answers in time
    async fn fetch_weather(&self, point: GeoPoint) -> Option<WeatherSample> {
        let provider = self.weather.as_ref()?;
        match provider.fetch(point).await {
            Ok(weather) => match validate_weather(&weather) {
                Ok(()) => Some(weather.with_source(WeatherSource::Live)),
                Err(reason) => {
                    tracing::warn!(
                        lat = point.latitude,
                        lon = point.longitude,
                        reason,
                        "Discarding implausible live weather, using climate estimate"
                    );
                    None
                }
            },
            Err(e) => {
                tracing::warn!(
                    lat = point.latitude,
                    lon = point.longitude,
                    error = %e,
                    "Could not fetch weather data, using climate estimate"
                );
                None
            }
        }
    }

    pub fn crops(&self) -> Vec<CropProfile> {
        self.engine.catalog().crops().to_vec()
    }

    pub fn locations(&self) -> Vec<Location> {
        self.engine.catalog().locations().to_vec()
    }
}
