//! Permission store error types.

/// Errors from looking up a permission grant.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Store returned an error status
    #[error("store error {status}: {message}")]
    Api { status: u16, message: String },

    /// Configured database root is not a usable base URL
    #[error("invalid store URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    /// Stored record has an unexpected shape
    #[error("JSON parse error: {message}")]
    Json { message: String },
}
