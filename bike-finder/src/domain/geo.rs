//! Coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

/// Earth radius used for distance calculations, in metres.
///
/// Equatorial radius (WGS-84), matching the figures the bike operator's own
/// apps report.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// A geographic position in decimal degrees.
///
/// No range validation is performed: values come from the operator API or
/// from device sensors. Non-finite values produce a NaN distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in metres.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance_meters(self, other)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self::new(latitude, longitude)
    }
}

/// Haversine distance between two coordinates, in metres.
///
/// Symmetric and exactly zero for identical inputs.
pub fn distance_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    // abs() keeps the result bit-identical when the arguments are swapped
    let d_lat = (b.latitude - a.latitude).abs().to_radians();
    let d_lon = (b.longitude - a.longitude).abs().to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}
