//! Application state for the web layer.

use std::sync::Arc;

use crate::bikes::BikeClient;
use crate::finder::Finder;
use crate::permission::RestPermissionStore;

/// The finder wired to the live bike API and permission store.
pub type LiveFinder = Finder<BikeClient, RestPermissionStore>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Nearest-station finder
    pub finder: Arc<LiveFinder>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(finder: LiveFinder) -> Self {
        Self {
            finder: Arc::new(finder),
        }
    }
}
