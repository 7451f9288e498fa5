//! Nearest-station finder.
//!
//! Answers "where is the closest bike I can take right now?" by joining the
//! station catalog with live availability and ranking by distance, behind a
//! location-permission check.

mod rank;
mod resolve;

pub use rank::rank_stations;
pub use resolve::{BikeSource, Finder, ResolveError, ResolveRequest};
