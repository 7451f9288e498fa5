//! Domain types for the bike finder.
//!
//! Everything here is built fresh for a single request and dropped when it
//! completes.

mod geo;
mod station;

pub use geo::{Coordinate, EARTH_RADIUS_M, distance_meters};
pub use station::{Availability, AvailabilityRecord, RankedStation, Station};
