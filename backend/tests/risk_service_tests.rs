//! Risk service integration tests
//!
//! Tests for the request surface including:
//! - Coordinate resolution fallbacks (request → geocoder → catalog)
//! - Live weather with synthetic fallback on upstream failure or timeout
//! - Error mapping for unknown crops and unresolvable locations
//! - Router-level prediction endpoint

use std::sync::Arc;
use std::time::Duration;

use aphid_risk_backend::config::{
    BaselineConfig, Config, FallbackConfig, GeocoderConfig, ModelConfig, ServerConfig,
    WeatherConfig,
};
use aphid_risk_backend::error::AppError;
use aphid_risk_backend::external::{with_timeout, Geocoder, UpstreamError, WeatherProvider};
use aphid_risk_backend::services::risk::{PredictInput, WeatherInput};
use aphid_risk_backend::services::RiskService;
use aphid_risk_backend::{create_app, load_engine, AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use shared::features::FeatureVector;
use shared::{
    CategoryKind, GeoPoint, HistoricalBaseline, LabelEncodings, Predictor, PredictorError,
    ReferenceCatalog, RiskEngine, RiskError, WeatherFallback, WeatherSample, WeatherSource,
};
use tower::ServiceExt;

// ============================================================================
// Test Collaborators
// ============================================================================

struct HumidityPredictor;

impl Predictor for HumidityPredictor {
    fn predict(&self, x: &FeatureVector) -> Result<f64, PredictorError> {
        Ok(x.humidity / 100.0)
    }
}

struct FixedGeocoder(GeoPoint);

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn resolve(&self, _name: &str) -> Result<GeoPoint, UpstreamError> {
        Ok(self.0)
    }
}

struct DownGeocoder;

#[async_trait]
impl Geocoder for DownGeocoder {
    async fn resolve(&self, _name: &str) -> Result<GeoPoint, UpstreamError> {
        Err(UpstreamError::Unavailable("connection refused".to_string()))
    }
}

struct FixedWeather(WeatherSample);

#[async_trait]
impl WeatherProvider for FixedWeather {
    async fn fetch(&self, _point: GeoPoint) -> Result<WeatherSample, UpstreamError> {
        Ok(self.0)
    }
}

struct SlowWeather;

#[async_trait]
impl WeatherProvider for SlowWeather {
    async fn fetch(&self, _point: GeoPoint) -> Result<WeatherSample, UpstreamError> {
        with_timeout(Duration::from_millis(20), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(WeatherSample::live(0.0, 0.0, 0.0, 0.0))
        })
        .await
    }
}

fn engine(fallback: WeatherFallback) -> Arc<RiskEngine> {
    let catalog = Arc::new(ReferenceCatalog::builtin());
    let baseline = Arc::new(HistoricalBaseline::seeded(&catalog, 42));
    let encodings = Arc::new(LabelEncodings::from_catalog(&catalog));
    Arc::new(
        RiskEngine::new(catalog, baseline, encodings, Arc::new(HumidityPredictor))
            .with_fallback(fallback),
    )
}

fn input(country: &str, crop: &str) -> PredictInput {
    PredictInput {
        country: country.to_string(),
        crop: crop.to_string(),
        coordinates: None,
        weather: None,
    }
}

fn test_config() -> Config {
    Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        model: ModelConfig {
            path: "unused.json".to_string(),
            encodings_path: None,
        },
        baseline: BaselineConfig {
            path: None,
            seed: 42,
        },
        geocoder: GeocoderConfig {
            base_url: "http://localhost".to_string(),
            user_agent: "test".to_string(),
            timeout_ms: 100,
        },
        weather: WeatherConfig {
            api_endpoint: "http://localhost".to_string(),
            api_key: None,
            timeout_ms: 100,
        },
        fallback: FallbackConfig {
            mode: WeatherFallback::Synthetic,
        },
    }
}

// ============================================================================
// Service Tests
// ============================================================================

#[tokio::test]
async fn test_supplied_weather_is_live() {
    let service = RiskService::new(engine(WeatherFallback::Synthetic));
    let mut request = input("USA", "Wheat");
    request.weather = Some(WeatherInput {
        temperature: 22.0,
        humidity: 70.0,
        rainfall: 5.0,
        wind_speed: 5.0,
    });

    let response = service.predict(request).await.unwrap();

    assert_eq!(response.weather_source, WeatherSource::Live);
    assert_eq!(response.risk, 0.7);
    assert_eq!(response.resolved_location, "USA");
    assert!(!response.used_nearest_neighbours);
    assert_eq!(response.crop_susceptibility, 0.8);
    assert_eq!(response.recommendations.len(), 4);
}

#[tokio::test]
async fn test_provider_weather_is_used() {
    let service = RiskService::new(engine(WeatherFallback::Synthetic))
        .with_weather_provider(Arc::new(FixedWeather(WeatherSample::live(25.0, 40.0, 0.0, 3.0))));

    let response = service.predict(input("France", "Potato")).await.unwrap();

    assert_eq!(response.weather_source, WeatherSource::Live);
    assert_eq!(response.weather.humidity, 40.0);
    assert_eq!(response.risk, 0.4);
    assert_eq!(response.recommendations.len(), 2);
}

#[tokio::test]
async fn test_weather_timeout_falls_back_to_synthetic() {
    let service = RiskService::new(engine(WeatherFallback::Synthetic))
        .with_weather_provider(Arc::new(SlowWeather));

    let response = service.predict(input("Kenya", "Rice")).await.unwrap();

    assert_eq!(response.weather_source, WeatherSource::Synthetic);
    assert!((0.0..=1.0).contains(&response.risk));
}

#[tokio::test]
async fn test_implausible_provider_weather_falls_back() {
    let service = RiskService::new(engine(WeatherFallback::Typical))
        .with_weather_provider(Arc::new(FixedWeather(WeatherSample::live(25.0, 180.0, 0.0, 3.0))));

    let response = service.predict(input("Egypt", "Cotton")).await.unwrap();

    assert_eq!(response.weather_source, WeatherSource::Default);
    assert_eq!(response.weather.humidity, 30.0);
}

#[tokio::test]
async fn test_typical_fallback_mode() {
    let service = RiskService::new(engine(WeatherFallback::Typical));
    let response = service.predict(input("Egypt", "Cotton")).await.unwrap();
    assert_eq!(response.weather_source, WeatherSource::Default);
    assert_eq!(response.weather.humidity, 30.0);
    assert_eq!(response.risk, 0.3);
}

#[tokio::test]
async fn test_geocoder_failure_uses_catalog_centroid() {
    let service =
        RiskService::new(engine(WeatherFallback::Synthetic)).with_geocoder(Arc::new(DownGeocoder));

    let response = service.predict(input("Nigeria", "Maize")).await.unwrap();

    assert_eq!(response.coordinates, GeoPoint::new(9.1, 8.7));
    assert_eq!(response.resolved_location, "Nigeria");
}

#[tokio::test]
async fn test_geocoded_unknown_country_uses_nearest_neighbours() {
    let service = RiskService::new(engine(WeatherFallback::Synthetic))
        .with_geocoder(Arc::new(FixedGeocoder(GeoPoint::new(10.0, 10.0))));

    let response = service.predict(input("Cameroon", "Maize")).await.unwrap();

    assert!(response.used_nearest_neighbours);
    assert_eq!(response.nearest.len(), 5);
    assert_eq!(response.resolved_location, "Nigeria");
    assert!(response
        .nearest
        .windows(2)
        .all(|w| w[0].distance_km <= w[1].distance_km));
}

#[tokio::test]
async fn test_unknown_country_without_coordinates_is_unresolved() {
    let service =
        RiskService::new(engine(WeatherFallback::Synthetic)).with_geocoder(Arc::new(DownGeocoder));

    let err = service.predict(input("Atlantis", "Wheat")).await.unwrap_err();

    assert!(matches!(err, AppError::LocationUnresolved(name) if name == "Atlantis"));
}

#[tokio::test]
async fn test_unknown_crop_is_surfaced() {
    let service = RiskService::new(engine(WeatherFallback::Synthetic));
    let err = service.predict(input("USA", "Durian")).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Risk(RiskError::UnknownCategory {
            kind: CategoryKind::Crop,
            ..
        })
    ));
}

#[tokio::test]
async fn test_blank_country_is_rejected() {
    let service = RiskService::new(engine(WeatherFallback::Synthetic));
    let err = service.predict(input("   ", "Wheat")).await.unwrap_err();
    assert!(matches!(err, AppError::Validation { field, .. } if field == "country"));
}

#[tokio::test]
async fn test_implausible_weather_is_rejected() {
    let service = RiskService::new(engine(WeatherFallback::Synthetic));
    let mut request = input("USA", "Wheat");
    request.weather = Some(WeatherInput {
        temperature: 22.0,
        humidity: 140.0,
        rainfall: 5.0,
        wind_speed: 5.0,
    });
    let err = service.predict(request).await.unwrap_err();
    assert!(matches!(err, AppError::Validation { field, .. } if field == "weather"));
}

// ============================================================================
// Startup Tests
// ============================================================================

#[test]
fn test_load_engine_from_artifacts() {
    let mut config = test_config();
    config.model.path = "../artifacts/aphid_risk_model.json".to_string();

    let engine = load_engine(&config).unwrap();
    let request = shared::RiskRequest {
        location: "India".to_string(),
        point: GeoPoint::new(20.6, 78.9),
        crop: "Cotton".to_string(),
        weather: Some(WeatherSample::live(28.0, 80.0, 12.0, 3.0)),
    };
    let mut rng = rand::rngs::mock::StepRng::new(0, 1);
    let assessment = engine.predict_at(&request, 7, &mut rng).unwrap();
    assert!((0.0..=1.0).contains(&assessment.score.value()));
}

#[test]
fn test_missing_model_fails_startup() {
    let mut config = test_config();
    config.model.path = "does/not/exist.json".to_string();
    let err = load_engine(&config).unwrap_err();
    assert!(err.to_string().contains("does/not/exist.json"));
}

// ============================================================================
// Router Tests
// ============================================================================

fn app() -> axum::Router {
    let state = AppState {
        risk: RiskService::new(engine(WeatherFallback::Synthetic)),
        config: Arc::new(test_config()),
    };
    create_app(state)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_predict_endpoint() {
    let body = serde_json::json!({
        "country": "USA",
        "crop": "Wheat",
        "weather": {"temperature": 22.0, "humidity": 70.0, "rainfall": 5.0, "wind_speed": 5.0}
    });
    let response = app().oneshot(post_json("/api/v1/predict", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["risk"], 0.7);
    assert_eq!(json["risk_level"], "high");
    assert_eq!(json["weather_source"], "live");
    assert_eq!(json["resolved_location"], "USA");
}

#[tokio::test]
async fn test_legacy_predict_path() {
    let body = serde_json::json!({
        "country": "Canada",
        "crop": "Barley",
        "coordinates": {"latitude": 56.1, "longitude": -106.3}
    });
    let response = app().oneshot(post_json("/api/predict", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["weather_source"], "synthetic");
}

#[tokio::test]
async fn test_predict_endpoint_unknown_crop() {
    let body = serde_json::json!({"country": "USA", "crop": "Durian"});
    let response = app().oneshot(post_json("/api/v1/predict", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "UNKNOWN_CATEGORY");
}

#[tokio::test]
async fn test_crops_endpoint() {
    let request = Request::builder()
        .uri("/api/v1/crops")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().map(Vec::len), Some(8));
    assert_eq!(json[0]["name"], "Wheat");
}

#[tokio::test]
async fn test_health_endpoint() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["reference_locations"], 48);
    assert_eq!(json["live_weather"], false);
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn known_crop() -> impl Strategy<Value = String> {
        prop::sample::select(
            ReferenceCatalog::builtin()
                .crops()
                .iter()
                .map(|c| c.name.clone())
                .collect::<Vec<_>>(),
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn supplied_weather_always_scores_in_range(
            crop in known_crop(),
            lat in -90.0f64..90.0,
            lon in -180.0f64..180.0,
            temperature in -20.0f64..45.0,
            humidity in 0.0f64..100.0,
            rainfall in 0.0f64..50.0,
            wind_speed in 0.0f64..30.0,
        ) {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            let service = RiskService::new(engine(WeatherFallback::Synthetic));
            let request = PredictInput {
                country: "Somewhere".to_string(),
                crop,
                coordinates: Some(GeoPoint::new(lat, lon)),
                weather: Some(WeatherInput { temperature, humidity, rainfall, wind_speed }),
            };

            let response = runtime.block_on(service.predict(request)).unwrap();

            prop_assert!((0.0..=1.0).contains(&response.risk));
            prop_assert_eq!(response.weather_source, WeatherSource::Live);
            prop_assert!(response.used_nearest_neighbours);
            prop_assert_eq!(response.risk, (response.risk * 100.0).round() / 100.0);
        }
    }
}
