//! WebAssembly module for the Aphid Risk dashboard
//!
//! Provides client-side computation for:
//! - Nearest reference locations for a map click
//! - Risk level classification and recommendations
//! - Typical climate weather for offline previews
//! - Input validation before a prediction is submitted

use std::str::FromStr;

use serde::Serialize;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::{ClimateWeatherModel, GeoIndex, ReferenceCatalog, RiskScore};

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

#[derive(Serialize)]
struct NearbyJs<'a> {
    name: &'a str,
    climate_zone: ClimateZone,
    distance_km: f64,
}

/// Great-circle distance between two points in kilometres
#[wasm_bindgen]
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    shared::haversine_km(GeoPoint::new(lat1, lon1), GeoPoint::new(lat2, lon2))
}

/// The `k` closest reference locations as a JSON array
#[wasm_bindgen]
pub fn nearest_locations(latitude: f64, longitude: f64, k: usize) -> Result<String, JsValue> {
    let point = GeoPoint::new(latitude, longitude);
    validate_coordinates(&point).map_err(JsValue::from_str)?;

    let catalog = ReferenceCatalog::builtin();
    let neighbours = GeoIndex::new(&catalog)
        .nearest(point, k)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let rows: Vec<NearbyJs> = neighbours
        .iter()
        .map(|n| NearbyJs {
            name: &n.location.name,
            climate_zone: n.location.climate_zone,
            distance_km: n.distance_km,
        })
        .collect();

    serde_json::to_string(&rows).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Classify a raw model score, e.g. "Moderate Risk"
#[wasm_bindgen]
pub fn classify_risk(score: f64) -> String {
    RiskScore::clamped(score).level().to_string()
}

/// Recommended actions for a raw model score as a JSON array
#[wasm_bindgen]
pub fn risk_recommendations(score: f64) -> String {
    let actions = recommended_actions(RiskScore::clamped(score).value());
    serde_json::to_string(&actions).unwrap_or_else(|_| "[]".to_string())
}

/// Susceptibility factor of a crop; unknown crops get the catalog default
#[wasm_bindgen]
pub fn crop_susceptibility(crop: &str) -> f64 {
    ReferenceCatalog::builtin().susceptibility_of(crop.trim())
}

/// Crop names known to the model
#[wasm_bindgen]
pub fn crop_names() -> js_sys::Array {
    ReferenceCatalog::builtin()
        .crops()
        .iter()
        .map(|c| JsValue::from_str(&c.name))
        .collect()
}

/// Deterministic weather for a climate zone and month as JSON
#[wasm_bindgen]
pub fn typical_weather(zone: &str, month: u32) -> Result<String, JsValue> {
    let zone = ClimateZone::from_str(zone).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let weather = ClimateWeatherModel::new().typical(zone, month);
    serde_json::to_string(&weather).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Check caller-entered weather before sending it to the server
#[wasm_bindgen]
pub fn check_weather(temperature: f64, humidity: f64, rainfall: f64, wind_speed: f64) -> Option<String> {
    let weather = WeatherSample::live(temperature, humidity, rainfall, wind_speed);
    match validate_weather(&weather) {
        Ok(()) => None,
        Err(msg) => {
            web_sys::console::warn_1(&JsValue::from_str(msg));
            Some(msg.to_string())
        }
    }
}
