//! Application configuration from the environment.

use std::net::SocketAddr;

use crate::bikes::BikeClientConfig;
use crate::permission::RestStoreConfig;

/// Default listen address.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Errors from reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is not set
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed
    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bike API client settings.
    pub bikes: BikeClientConfig,

    /// Permission store settings.
    pub store: RestStoreConfig,

    /// Address the webhook listens on.
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    ///
    /// - `BIKE_CLIENT_IDENTIFIER` (required)
    /// - `BIKE_API_BASE_URL`
    /// - `BIKE_API_RETRIES`
    /// - `PERMISSION_STORE_URL` (required)
    /// - `PERMISSION_STORE_TOKEN`
    /// - `BIND_ADDR`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let client_identifier =
            get("BIKE_CLIENT_IDENTIFIER").ok_or(ConfigError::Missing("BIKE_CLIENT_IDENTIFIER"))?;
        let mut bikes = BikeClientConfig::new(client_identifier);
        if let Some(url) = get("BIKE_API_BASE_URL") {
            bikes = bikes.with_base_url(url);
        }
        if let Some(retries) = get("BIKE_API_RETRIES") {
            let n = retries.parse::<u32>().map_err(|e| ConfigError::Invalid {
                name: "BIKE_API_RETRIES",
                message: e.to_string(),
            })?;
            bikes = bikes.with_max_retries(n);
        }

        let store_url =
            get("PERMISSION_STORE_URL").ok_or(ConfigError::Missing("PERMISSION_STORE_URL"))?;
        let mut store = RestStoreConfig::new(store_url);
        if let Some(token) = get("PERMISSION_STORE_TOKEN") {
            store = store.with_auth_token(token);
        }

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDR",
                message: e.to_string(),
            })?;

        Ok(Self {
            bikes,
            store,
            bind_addr,
        })
    }
}
