//! Location-permission gate.

use std::fmt;

use tracing::debug;

use super::error::StoreError;
use super::key::StoreKey;
use super::store::PermissionStore;

/// Where a gate is in its lifecycle.
///
/// `Unknown` is the only non-terminal state. The gate moves out of it at
/// most once, after a single store lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    /// The store has not been consulted yet.
    Unknown,
    /// The user has granted access to their precise device location.
    Granted,
    /// No grant on record. The caller should ask the user for permission.
    NotGranted,
}

impl PermissionState {
    /// Returns true once the gate has reached a decision.
    pub fn is_terminal(self) -> bool {
        !matches!(self, PermissionState::Unknown)
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PermissionState::Unknown => "unknown",
            PermissionState::Granted => "granted",
            PermissionState::NotGranted => "not granted",
        };
        f.write_str(s)
    }
}

/// Decides, for one request, whether resolution may use the device location.
///
/// The gate never asks the user for permission itself; reaching
/// `NotGranted` is the signal for the front-end to do so.
pub struct PermissionGate<'a, S> {
    store: &'a S,
    key: StoreKey,
    state: PermissionState,
}

impl<'a, S: PermissionStore> PermissionGate<'a, S> {
    /// Create a gate for `user_id`, starting in `Unknown`.
    pub fn new(store: &'a S, user_id: &str) -> Self {
        Self {
            store,
            key: StoreKey::for_user(user_id),
            state: PermissionState::Unknown,
        }
    }

    /// Current state.
    pub fn state(&self) -> PermissionState {
        self.state
    }

    /// Consult the store and move to a terminal state.
    ///
    /// Once terminal, further calls return the same state without another
    /// lookup. A store failure leaves the gate in `Unknown`.
    pub async fn resolve(&mut self) -> Result<PermissionState, StoreError> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }

        let record = self.store.lookup(&self.key).await?;

        self.state = match record {
            Some(r) if r.granted_location_access => PermissionState::Granted,
            _ => PermissionState::NotGranted,
        };

        debug!(user_key = %self.key, state = %self.state, "Permission gate resolved");
        Ok(self.state)
    }
}
