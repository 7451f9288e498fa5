//! Permission store backed by a realtime-database REST endpoint.
//!
//! Records live at `{base}/users/{key}.json`. A missing node is returned as
//! the literal body `null`.

use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use super::error::StoreError;
use super::key::StoreKey;
use super::store::{PermissionRecord, PermissionStore};

/// Configuration for the REST permission store.
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    /// Database root, e.g. `https://example.firebaseio.com`
    pub base_url: String,
    /// Optional token sent as the `auth` query parameter
    pub auth_token: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl RestStoreConfig {
    /// Create a new config for the given database root.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
            timeout_secs: 10,
        }
    }

    /// Authenticate requests with `token`.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Shape of a user node in the realtime database.
#[derive(Debug, Default, Deserialize)]
struct UserNodeDto {
    #[serde(default)]
    location: bool,
}

/// Read-only client for permission records.
#[derive(Debug, Clone)]
pub struct RestPermissionStore {
    http: reqwest::Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl RestPermissionStore {
    /// Create a new store client.
    pub fn new(config: RestStoreConfig) -> Result<Self, StoreError> {
        let invalid = |message: String| StoreError::InvalidUrl {
            url: config.base_url.clone(),
            message,
        };
        let base_url = Url::parse(&config.base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("not a base URL".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            auth_token: config.auth_token,
        })
    }

    /// URL of the record for `key`. The key is pushed as one path segment,
    /// so its own `%` escapes and any `?` survive the trip to the server.
    fn record_url(&self, key: &StoreKey) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("users")
                .push(&format!("{}.json", key.as_str()));
        }
        url
    }
}

impl PermissionStore for RestPermissionStore {
    async fn lookup(&self, key: &StoreKey) -> Result<Option<PermissionRecord>, StoreError> {
        let url = self.record_url(key);

        let mut request = self.http.get(url);
        if let Some(token) = &self.auth_token {
            request = request.query(&[("auth", token)]);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        let node: Option<UserNodeDto> =
            serde_json::from_str(&body).map_err(|e| StoreError::Json {
                message: e.to_string(),
            })?;

        debug!(user_key = %key, found = node.is_some(), "Looked up permission record");

        Ok(node.map(|node| PermissionRecord {
            user_id: key.user_id().to_string(),
            granted_location_access: node.location,
        }))
    }
}
