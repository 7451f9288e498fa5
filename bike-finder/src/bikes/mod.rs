//! Bike-share operator API client.
//!
//! Two endpoints feed the finder:
//! - the station catalog (`/stations`), which changes rarely
//! - live availability (`/stations/availability`), which changes constantly
//!
//! Every request carries the operator-issued `Client-Identifier` header.

mod client;
mod error;
mod types;

pub use client::{BikeClient, BikeClientConfig, DEFAULT_BASE_URL};
pub use error::BikeApiError;
pub use types::{
    AvailabilityResponse, BoundDto, CountsDto, StationAvailabilityDto, StationDto,
    StationsResponse,
};
