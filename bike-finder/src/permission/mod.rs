//! Location-permission gating.
//!
//! The front-end persists whether each user has granted access to their
//! precise device location. This module reads those grants and turns them
//! into a per-request decision.

mod error;
mod gate;
mod key;
mod rest;
mod store;

pub use error::StoreError;
pub use gate::{PermissionGate, PermissionState};
pub use key::StoreKey;
pub use rest::{RestPermissionStore, RestStoreConfig};
pub use store::{InMemoryPermissionStore, PermissionRecord, PermissionStore};
