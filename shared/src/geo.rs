//! Nearest-neighbour search over the reference catalog by great-circle distance

use serde::Serialize;

use crate::catalog::ReferenceCatalog;
use crate::error::{RiskError, RiskResult};
use crate::models::Location;
use crate::types::GeoPoint;

/// Mean Earth radius in km
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Number of neighbours blended for an unknown location
pub const DEFAULT_NEIGHBOURS: usize = 5;

/// Haversine great-circle distance between two points in km
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = b.longitude.to_radians() - a.longitude.to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push h marginally above 1 for antipodal points
    let c = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();

    c * EARTH_RADIUS_KM
}

/// A reference location together with its distance from the query point
#[derive(Debug, Clone, Serialize)]
pub struct Neighbour<'a> {
    pub location: &'a Location,
    pub distance_km: f64,
}

/// Brute-force great-circle index over a catalog
#[derive(Debug, Clone, Copy)]
pub struct GeoIndex<'a> {
    catalog: &'a ReferenceCatalog,
}

impl<'a> GeoIndex<'a> {
    pub fn new(catalog: &'a ReferenceCatalog) -> Self {
        Self { catalog }
    }

    /// The `k` closest reference locations, nearest first.
    ///
    /// Equal distances keep catalog insertion order. Asking for more than the
    /// catalog holds returns the whole catalog sorted.
    pub fn nearest(&self, point: GeoPoint, k: usize) -> RiskResult<Vec<Neighbour<'a>>> {
        if self.catalog.is_empty() {
            return Err(RiskError::NoReferenceLocation);
        }

        let mut neighbours: Vec<Neighbour<'a>> = self
            .catalog
            .locations()
            .iter()
            .map(|location| Neighbour {
                location,
                distance_km: haversine_km(point, location.point()),
            })
            .collect();

        // sort_by is stable, which gives the insertion-order tie break
        neighbours.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        neighbours.truncate(k);

        Ok(neighbours)
    }

    /// The single closest reference location
    pub fn closest(&self, point: GeoPoint) -> RiskResult<Neighbour<'a>> {
        self.nearest(point, 1)?
            .into_iter()
            .next()
            .ok_or(RiskError::NoReferenceLocation)
    }
}
