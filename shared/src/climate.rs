//! Synthetic weather generation per climate zone
//!
//! This is the only weather fallback in the platform. Live serving and any
//! offline dataset tooling must both draw from [`zone_parameters`] so that the
//! distributions seen at training time match those seen at serving time.

use std::f64::consts::PI;
use std::ops::RangeInclusive;

use rand::Rng;

use crate::models::{ClimateZone, WeatherSample, WeatherSource};

/// Months (1-12) in which tropical zones use the wet-season rainfall range
pub const WET_SEASON: RangeInclusive<u32> = 5..=9;

/// Closed interval a value is drawn from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Temperature behaviour of a zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemperatureModel {
    /// Same range all year
    Flat(Span),
    /// `mean + amplitude * sin(2π(month - 3) / 12)`, then ± `spread`
    Seasonal { mean: f64, amplitude: f64, spread: f64 },
}

impl TemperatureModel {
    pub fn span(&self, month: u32) -> Span {
        match *self {
            TemperatureModel::Flat(span) => span,
            TemperatureModel::Seasonal {
                mean,
                amplitude,
                spread,
            } => {
                let centre = mean + amplitude * (2.0 * PI * (month as f64 - 3.0) / 12.0).sin();
                Span::new(centre - spread, centre + spread)
            }
        }
    }
}

/// Uniform distribution parameters for one climate zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneParameters {
    pub temperature: TemperatureModel,
    pub humidity: Span,
    pub rainfall: Span,
    /// Rainfall range during [`WET_SEASON`], if the zone has one
    pub wet_season_rainfall: Option<Span>,
    pub wind_speed: Span,
}

impl ZoneParameters {
    pub fn rainfall_span(&self, month: u32) -> Span {
        match self.wet_season_rainfall {
            Some(wet) if WET_SEASON.contains(&month) => wet,
            _ => self.rainfall,
        }
    }
}

/// The shared parameter table
pub const fn zone_parameters(zone: ClimateZone) -> ZoneParameters {
    match zone {
        ClimateZone::Tropical => ZoneParameters {
            temperature: TemperatureModel::Flat(Span::new(20.0, 35.0)),
            humidity: Span::new(60.0, 95.0),
            rainfall: Span::new(0.0, 100.0),
            wet_season_rainfall: Some(Span::new(5.0, 300.0)),
            wind_speed: Span::new(0.0, 15.0),
        },
        ClimateZone::Temperate => ZoneParameters {
            temperature: TemperatureModel::Seasonal {
                mean: 15.0,
                amplitude: 10.0,
                spread: 8.0,
            },
            humidity: Span::new(40.0, 85.0),
            rainfall: Span::new(0.0, 150.0),
            wet_season_rainfall: None,
            wind_speed: Span::new(0.0, 20.0),
        },
        ClimateZone::Continental => ZoneParameters {
            temperature: TemperatureModel::Seasonal {
                mean: 10.0,
                amplitude: 15.0,
                spread: 12.0,
            },
            humidity: Span::new(30.0, 75.0),
            rainfall: Span::new(0.0, 100.0),
            wet_season_rainfall: None,
            wind_speed: Span::new(0.0, 25.0),
        },
        ClimateZone::Arid => ZoneParameters {
            temperature: TemperatureModel::Flat(Span::new(15.0, 45.0)),
            humidity: Span::new(10.0, 50.0),
            rainfall: Span::new(0.0, 30.0),
            wet_season_rainfall: None,
            wind_speed: Span::new(0.0, 30.0),
        },
        ClimateZone::Highland => ZoneParameters {
            temperature: TemperatureModel::Flat(Span::new(5.0, 25.0)),
            humidity: Span::new(50.0, 90.0),
            rainfall: Span::new(0.0, 200.0),
            wet_season_rainfall: None,
            wind_speed: Span::new(0.0, 15.0),
        },
    }
}

/// Wrap any month number into 1-12
pub fn normalize_month(month: u32) -> u32 {
    ((month as i64 - 1).rem_euclid(12) + 1) as u32
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Generates plausible weather for a climate zone
#[derive(Debug, Clone, Copy, Default)]
pub struct ClimateWeatherModel;

impl ClimateWeatherModel {
    pub fn new() -> Self {
        Self
    }

    pub fn parameters(&self, zone: ClimateZone) -> ZoneParameters {
        zone_parameters(zone)
    }

    /// Draw a synthetic sample for `zone` in `month`
    pub fn sample<R: Rng + ?Sized>(&self, zone: ClimateZone, month: u32, rng: &mut R) -> WeatherSample {
        let month = normalize_month(month);
        let params = zone_parameters(zone);

        WeatherSample {
            temperature: round1(params.temperature.span(month).sample(rng)),
            humidity: round1(params.humidity.sample(rng)),
            rainfall: round1(params.rainfall_span(month).sample(rng)),
            wind_speed: round1(params.wind_speed.sample(rng)),
            source: WeatherSource::Synthetic,
        }
    }

    /// Deterministic typical conditions: the midpoint of every range
    pub fn typical(&self, zone: ClimateZone, month: u32) -> WeatherSample {
        let month = normalize_month(month);
        let params = zone_parameters(zone);

        WeatherSample {
            temperature: round1(params.temperature.span(month).midpoint()),
            humidity: round1(params.humidity.midpoint()),
            rainfall: round1(params.rainfall_span(month).midpoint()),
            wind_speed: round1(params.wind_speed.midpoint()),
            source: WeatherSource::Default,
        }
    }
}
