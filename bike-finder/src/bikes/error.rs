//! Bike API error types.

/// Errors that can occur when talking to the bike-share API.
#[derive(Debug, thiserror::Error)]
pub enum BikeApiError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The operator rejected our client identifier
    #[error("unauthorized: check BIKE_CLIENT_IDENTIFIER")]
    Unauthorized,

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected schema
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// The client identifier cannot be sent as a header value
    #[error("invalid client identifier format")]
    InvalidClientIdentifier,
}

impl BikeApiError {
    /// Returns true if the response arrived but could not be understood.
    pub fn is_parse(&self) -> bool {
        matches!(self, BikeApiError::Json { .. })
    }

    /// Returns true if repeating the request might succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            BikeApiError::Http(e) => !e.is_builder() && !e.is_decode(),
            BikeApiError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
