//! Shared application state for the lease broker server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`. Both the HTTP handlers and the expirer task
//! hold the same `store`, per §5's "no duplicate state" requirement.

use std::sync::Arc;

use leasebroker_core::Clock;
use leasebroker_storage::ResourceStore;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// The resource store, shared with the background expirer.
    pub store: Arc<dyn ResourceStore>,
    /// The clock, shared with the background expirer so tests can
    /// inject a virtual clock across both.
    pub clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
