//! Validation utilities for risk inputs

use crate::models::WeatherSample;
use crate::types::GeoPoint;

/// Coldest and hottest air temperatures ever recorded at the surface, in °C
pub const TEMPERATURE_BOUNDS: (f64, f64) = (-90.0, 60.0);

// ============================================================================
// Location Validations
// ============================================================================

/// Validate latitude/longitude are within WGS84 bounds
pub fn validate_coordinates(point: &GeoPoint) -> Result<(), &'static str> {
    if !point.latitude.is_finite() || !(-90.0..=90.0).contains(&point.latitude) {
        return Err("Latitude must be between -90 and 90");
    }
    if !point.longitude.is_finite() || !(-180.0..=180.0).contains(&point.longitude) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

/// Validate a location name is usable
pub fn validate_location_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Country name is required and must be valid");
    }
    Ok(())
}

// ============================================================================
// Weather Validations
// ============================================================================

/// Validate a weather sample is physically plausible
pub fn validate_weather(weather: &WeatherSample) -> Result<(), &'static str> {
    let (min_temp, max_temp) = TEMPERATURE_BOUNDS;
    if !weather.temperature.is_finite()
        || weather.temperature < min_temp
        || weather.temperature > max_temp
    {
        return Err("Temperature is outside physical bounds");
    }
    if !weather.humidity.is_finite() || !(0.0..=100.0).contains(&weather.humidity) {
        return Err("Humidity must be between 0 and 100%");
    }
    if !weather.rainfall.is_finite() || weather.rainfall < 0.0 {
        return Err("Rainfall cannot be negative");
    }
    if !weather.wind_speed.is_finite() || weather.wind_speed < 0.0 {
        return Err("Wind speed cannot be negative");
    }
    Ok(())
}

/// Check a value lies in [0, 1]
pub fn is_unit_interval(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_coordinates_valid() {
        assert!(validate_coordinates(&GeoPoint::new(39.5, -98.35)).is_ok());
        assert!(validate_coordinates(&GeoPoint::new(-90.0, 180.0)).is_ok());
    }

    #[test]
    fn test_validate_coordinates_out_of_range() {
        assert!(validate_coordinates(&GeoPoint::new(91.0, 0.0)).is_err());
        assert!(validate_coordinates(&GeoPoint::new(0.0, -181.0)).is_err());
        assert!(validate_coordinates(&GeoPoint::new(f64::NAN, 0.0)).is_err());
    }

    #[test]
    fn test_validate_location_name() {
        assert!(validate_location_name("Nigeria").is_ok());
        assert!(validate_location_name("   ").is_err());
        assert!(validate_location_name("").is_err());
    }

    #[test]
    fn test_validate_weather_valid() {
        assert!(validate_weather(&WeatherSample::live(22.0, 70.0, 5.0, 5.0)).is_ok());
        assert!(validate_weather(&WeatherSample::live(-17.0, 0.0, 0.0, 0.0)).is_ok());
    }

    #[test]
    fn test_validate_weather_humidity() {
        assert!(validate_weather(&WeatherSample::live(22.0, 101.0, 5.0, 5.0)).is_err());
        assert!(validate_weather(&WeatherSample::live(22.0, -1.0, 5.0, 5.0)).is_err());
    }

    #[test]
    fn test_validate_weather_negative_values() {
        assert!(validate_weather(&WeatherSample::live(22.0, 70.0, -0.1, 5.0)).is_err());
        assert!(validate_weather(&WeatherSample::live(22.0, 70.0, 5.0, -2.0)).is_err());
        assert!(validate_weather(&WeatherSample::live(75.0, 70.0, 5.0, 5.0)).is_err());
    }

    #[test]
    fn test_unit_interval() {
        assert!(is_unit_interval(0.0));
        assert!(is_unit_interval(1.0));
        assert!(!is_unit_interval(1.01));
    }
}
