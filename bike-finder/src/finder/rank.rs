//! Station ranking.
//!
//! Joins the catalog with live availability and orders the stations that
//! have bikes by distance from the user.

use std::cmp::Ordering;

use crate::domain::{Availability, Coordinate, RankedStation, Station};

/// Rank stations with bikes by distance from `user`.
///
/// A station is kept only if the availability mapping reports a positive
/// bike count for its id; catalog stations missing from the mapping, and
/// mapping entries missing from the catalog, are dropped.
///
/// Returns stations sorted nearest-first, ties broken by ascending id.
/// An empty result is a valid answer, not an error.
pub fn rank_stations(
    stations: Vec<Station>,
    availability: &Availability,
    user: &Coordinate,
) -> Vec<RankedStation> {
    let mut ranked: Vec<RankedStation> = stations
        .into_iter()
        .filter_map(|station| {
            let bikes = availability.bikes_at(&station.id).filter(|&n| n > 0)?;
            Some(RankedStation {
                distance_meters: user.distance_to(&station.location),
                id: station.id,
                display_name: station.display_name,
                bikes_available: bikes,
            })
        })
        .collect();

    ranked.sort_by(compare_ranked);
    ranked
}

/// Nearest first, then by id. NaN distances sort last.
fn compare_ranked(a: &RankedStation, b: &RankedStation) -> Ordering {
    a.distance_meters
        .total_cmp(&b.distance_meters)
        .then_with(|| a.id.cmp(&b.id))
}
