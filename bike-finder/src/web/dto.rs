//! Data transfer objects for webhook requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::Coordinate;

/// A fulfillment request from the conversational front-end.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookRequest {
    /// Action resolved by the front-end (e.g. "closest_bike")
    pub action: String,

    /// Stable user identity from the assistant platform
    pub user_id: String,

    /// Whether the device reports that location access was granted
    #[serde(default)]
    pub permission_granted: bool,

    /// Precise device location, when shared
    #[serde(default)]
    pub device_location: Option<Coordinate>,
}

/// Reply spoken back to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookResponse {
    /// Text to say
    pub speech: String,

    /// Whether the conversation stays open for the user's answer
    pub expect_user_response: bool,

    /// Present when the front-end should ask for a permission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_request: Option<PermissionPrompt>,
}

/// Permission the front-end should ask the user for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PermissionPrompt {
    /// Why we are asking, read to the user
    pub reason: String,

    /// Platform permission name
    pub permission: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
