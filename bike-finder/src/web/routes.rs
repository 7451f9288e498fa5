//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use std::error::Error as _;

use tracing::{info, warn};

use crate::domain::RankedStation;
use crate::finder::{BikeSource, Finder, ResolveRequest};
use crate::permission::{PermissionState, PermissionStore};

use super::dto::*;
use super::state::AppState;

/// Permission asked for before resolving. Phones cannot use coarse location.
const LOCATION_PERMISSION: &str = "DEVICE_PRECISE_LOCATION";

/// Actions the front-end can dispatch to us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Conversation start
    Welcome,
    /// Find the nearest station with bikes
    ClosestBike,
    /// Check the permission grant, asking for it if missing
    RequestLocation,
}

impl Action {
    /// Parse the front-end's action name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "input.welcome" => Some(Action::Welcome),
            "closest_bike" => Some(Action::ClosestBike),
            "request_location" => Some(Action::RequestLocation),
            _ => None,
        }
    }
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(webhook))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Fulfillment webhook.
async fn webhook(
    State(state): State<AppState>,
    Json(req): Json<WebhookRequest>,
) -> Result<Json<WebhookResponse>, AppError> {
    let response = handle_action(state.finder.as_ref(), &req).await?;
    Ok(Json(response))
}

/// Dispatch one webhook request to the finder.
///
/// Only an unknown action is an error; every resolution failure becomes a
/// spoken reply.
pub async fn handle_action<B: BikeSource, P: PermissionStore>(
    finder: &Finder<B, P>,
    req: &WebhookRequest,
) -> Result<WebhookResponse, AppError> {
    let action = Action::parse(&req.action).ok_or_else(|| AppError::BadRequest {
        message: format!("Unknown action: {}", req.action),
    })?;

    info!(?action, "Handling webhook");

    let response = match action {
        Action::Welcome => welcome(),
        Action::ClosestBike => closest_bike(finder, req, None).await,
        Action::RequestLocation => match finder.permission(&req.user_id).await {
            Ok(state @ PermissionState::Granted) => closest_bike(finder, req, Some(state)).await,
            Ok(_) => ask_for_location(),
            Err(e) => {
                warn!(error = %e, cause = ?e.source(), "Permission lookup failed");
                apology()
            }
        },
    };

    Ok(response)
}

/// Resolve and speak the nearest station. `known` is a gate decision
/// already made for this request.
async fn closest_bike<B: BikeSource, P: PermissionStore>(
    finder: &Finder<B, P>,
    req: &WebhookRequest,
    known: Option<PermissionState>,
) -> WebhookResponse {
    // Only trust the location when the device says it was shared
    let location = req.device_location.filter(|_| req.permission_granted);
    let request = ResolveRequest::new(req.user_id.clone(), location);

    let result = match known {
        Some(state) => finder.resolve_for(state, &request).await,
        None => finder.resolve(&request).await,
    };

    match result {
        Ok(station) => found(&station),
        Err(e) => {
            warn!(error = %e, cause = ?e.source(), "Could not resolve nearest station");
            apology()
        }
    }
}

fn welcome() -> WebhookResponse {
    WebhookResponse {
        speech: "Welcome to city bike finder!".to_string(),
        expect_user_response: true,
        permission_request: None,
    }
}

fn ask_for_location() -> WebhookResponse {
    let reason = "To find the closest bike".to_string();
    WebhookResponse {
        speech: reason.clone(),
        expect_user_response: true,
        permission_request: Some(PermissionPrompt {
            reason,
            permission: LOCATION_PERMISSION.to_string(),
        }),
    }
}

fn found(station: &RankedStation) -> WebhookResponse {
    WebhookResponse {
        speech: format!(
            "The closest station with bikes is {}. It has {} bikes available",
            station.display_name, station.bikes_available
        ),
        expect_user_response: false,
        permission_request: None,
    }
}

fn apology() -> WebhookResponse {
    WebhookResponse {
        speech: "I am sorry but I failed to find any nearby bikes.".to_string(),
        expect_user_response: false,
        permission_request: None,
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
        };

        warn!(%status, %message, "Rejected webhook request");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
