//! Bike API response types.
//!
//! These mirror the operator's JSON and are converted into domain types
//! straight after parsing.

use serde::{Deserialize, Deserializer};

use crate::domain::{AvailabilityRecord, Coordinate, Station};

use super::error::BikeApiError;

/// Response from the catalog endpoint.
#[derive(Debug, Deserialize)]
pub struct StationsResponse {
    pub stations: Vec<StationDto>,
}

/// One station in the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct StationDto {
    #[serde(deserialize_with = "station_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    /// Outline of the docking area; the first point is the station position.
    pub bounds: Vec<BoundDto>,
}

/// A point in a station's bounds.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BoundDto {
    pub latitude: f64,
    pub longitude: f64,
}

/// Response from the availability endpoint.
#[derive(Debug, Deserialize)]
pub struct AvailabilityResponse {
    pub stations: Vec<StationAvailabilityDto>,
}

/// Availability for one station.
#[derive(Debug, Clone, Deserialize)]
pub struct StationAvailabilityDto {
    #[serde(deserialize_with = "station_id")]
    pub id: String,
    pub availability: CountsDto,
}

/// Bike and free-lock counts.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CountsDto {
    pub bikes: u32,
    #[serde(default)]
    pub locks: u32,
}

impl StationDto {
    /// Name shown to users: title followed by subtitle.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.title, self.subtitle).trim().to_string()
    }

    /// Convert to a domain station.
    ///
    /// Fails if the station has no position.
    pub fn into_station(self) -> Result<Station, BikeApiError> {
        let Some(position) = self.bounds.first().copied() else {
            return Err(BikeApiError::Json {
                message: format!("station {} has no bounds", self.id),
            });
        };

        let display_name = self.display_name();
        Ok(Station::new(
            self.id,
            display_name,
            Coordinate::new(position.latitude, position.longitude),
        ))
    }
}

impl From<StationAvailabilityDto> for AvailabilityRecord {
    fn from(dto: StationAvailabilityDto) -> Self {
        AvailabilityRecord {
            station_id: dto.id,
            bikes_available: dto.availability.bikes,
        }
    }
}

/// The operator sends numeric ids; accept strings too.
fn station_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}
