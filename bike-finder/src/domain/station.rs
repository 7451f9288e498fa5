//! Bike-share stations and their live availability.

use std::collections::HashMap;

use serde::Serialize;

use super::geo::Coordinate;

/// A physical bike-share station from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    /// Operator-assigned identifier, unique within one catalog snapshot.
    pub id: String,
    /// Human-readable name.
    pub display_name: String,
    /// Where the station is.
    pub location: Coordinate,
}

impl Station {
    /// Create a new station.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, location: Coordinate) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            location,
        }
    }
}

/// Live availability reported for one station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityRecord {
    pub station_id: String,
    pub bikes_available: u32,
}

/// Bikes available per station id, built fresh for each resolution.
///
/// Station ids in here need not exist in the catalog, and the reverse.
/// When the operator reports the same id twice the last report wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Availability {
    bikes: HashMap<String, u32>,
}

impl Availability {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bikes available at `station_id`, if the operator reported it.
    pub fn bikes_at(&self, station_id: &str) -> Option<u32> {
        self.bikes.get(station_id).copied()
    }

    /// Number of stations reported.
    pub fn len(&self) -> usize {
        self.bikes.len()
    }

    /// Returns true if no station was reported.
    pub fn is_empty(&self) -> bool {
        self.bikes.is_empty()
    }
}

impl FromIterator<AvailabilityRecord> for Availability {
    fn from_iter<I: IntoIterator<Item = AvailabilityRecord>>(iter: I) -> Self {
        Self {
            bikes: iter
                .into_iter()
                .map(|r| (r.station_id, r.bikes_available))
                .collect(),
        }
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for Availability {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        Self {
            bikes: iter.into_iter().map(|(id, n)| (id.into(), n)).collect(),
        }
    }
}

/// A station with bikes, annotated with its distance from the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedStation {
    pub id: String,
    pub display_name: String,
    /// Great-circle distance from the user, in metres.
    pub distance_meters: f64,
    /// Always positive.
    pub bikes_available: u32,
}
