//! Permission record lookup.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::error::StoreError;
use super::key::StoreKey;

/// A user's location-permission grant, as persisted by the front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRecord {
    pub user_id: String,
    pub granted_location_access: bool,
}

/// Read-only access to persisted permission grants.
///
/// This abstraction allows the gate to be tested with an in-memory store.
pub trait PermissionStore {
    /// Look up the record stored under `key`.
    ///
    /// Returns `Ok(None)` when the user has no record at all.
    fn lookup(
        &self,
        key: &StoreKey,
    ) -> impl Future<Output = Result<Option<PermissionRecord>, StoreError>> + Send;
}

impl<S: PermissionStore + Sync> PermissionStore for Arc<S> {
    fn lookup(
        &self,
        key: &StoreKey,
    ) -> impl Future<Output = Result<Option<PermissionRecord>, StoreError>> + Send {
        self.as_ref().lookup(key)
    }
}

/// Thread-safe in-memory permission store.
///
/// Used for tests and local development.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPermissionStore {
    inner: Arc<RwLock<HashMap<StoreKey, bool>>>,
}

impl InMemoryPermissionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record whether `user_id` has granted location access.
    pub async fn set(&self, user_id: &str, granted: bool) {
        let mut guard = self.inner.write().await;
        guard.insert(StoreKey::for_user(user_id), granted);
    }

    /// Remove any record for `user_id`.
    pub async fn remove(&self, user_id: &str) {
        let mut guard = self.inner.write().await;
        guard.remove(&StoreKey::for_user(user_id));
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl PermissionStore for InMemoryPermissionStore {
    async fn lookup(&self, key: &StoreKey) -> Result<Option<PermissionRecord>, StoreError> {
        let guard = self.inner.read().await;
        Ok(guard.get(key).map(|granted| PermissionRecord {
            user_id: key.user_id().to_string(),
            granted_location_access: *granted,
        }))
    }
}
