//! Bike-share HTTP API client.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::domain::{Availability, AvailabilityRecord, Station};

use super::error::BikeApiError;
use super::types::{AvailabilityResponse, StationDto, StationsResponse};

/// Default base URL for the Oslo City Bike API.
pub const DEFAULT_BASE_URL: &str = "https://oslobysykkel.no/api/v1";

/// Header carrying the operator-issued client token.
const CLIENT_IDENTIFIER_HEADER: &str = "client-identifier";

/// Configuration for the bike API client.
#[derive(Debug, Clone)]
pub struct BikeClientConfig {
    /// Token sent in the `Client-Identifier` header
    pub client_identifier: String,
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Extra attempts after a transient failure (transport error or 5xx)
    pub max_retries: u32,
}

impl BikeClientConfig {
    /// Create a new config with the given client identifier.
    pub fn new(client_identifier: impl Into<String>) -> Self {
        Self {
            client_identifier: client_identifier.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            max_retries: 0,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set how many times a transient failure is retried.
    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }
}

/// Client for the bike-share catalog and availability endpoints.
#[derive(Debug, Clone)]
pub struct BikeClient {
    http: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl BikeClient {
    /// Create a new bike API client.
    pub fn new(config: BikeClientConfig) -> Result<Self, BikeApiError> {
        let mut headers = HeaderMap::new();

        let identifier = HeaderValue::from_str(&config.client_identifier)
            .map_err(|_| BikeApiError::InvalidClientIdentifier)?;
        headers.insert(HeaderName::from_static(CLIENT_IDENTIFIER_HEADER), identifier);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
        })
    }

    /// Fetch the full station catalog.
    pub async fn fetch_stations(&self) -> Result<Vec<Station>, BikeApiError> {
        let response: StationsResponse = self.get_json("/stations").await?;

        let stations = response
            .stations
            .into_iter()
            .map(StationDto::into_station)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(station_count = stations.len(), "Fetched station catalog");
        Ok(stations)
    }

    /// Fetch current bike counts for every station the operator reports.
    pub async fn fetch_availability(&self) -> Result<Availability, BikeApiError> {
        let response: AvailabilityResponse = self.get_json("/stations/availability").await?;

        let availability: Availability = response
            .stations
            .into_iter()
            .map(AvailabilityRecord::from)
            .collect();

        debug!(
            station_count = availability.len(),
            "Fetched station availability"
        );
        Ok(availability)
    }

    /// GET `path` and parse the body, retrying transient failures.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BikeApiError> {
        let url = format!("{}{}", self.base_url, path);

        let mut attempt = 0;
        let body = loop {
            match self.get_once(&url).await {
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(url = %url, attempt, error = %e, "Retrying bike API request");
                }
                result => break result?,
            }
        };

        serde_json::from_str(&body).map_err(|e| BikeApiError::Json {
            message: e.to_string(),
        })
    }

    async fn get_once(&self, url: &str) -> Result<String, BikeApiError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(BikeApiError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BikeApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(response.text().await?)
    }
}
