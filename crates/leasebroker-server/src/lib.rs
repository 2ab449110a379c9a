//! HTTP front end for the lease broker.
//!
//! Wires the transport-agnostic `leasebroker-core` engine to Axum routes,
//! owns process configuration, and spawns the background expirer
//! alongside the HTTP listener.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod wire;

use std::sync::Arc;

use axum::Router;

use state::AppState;

/// Build the full `/api` router with tracing middleware attached, sharing
/// one [`AppState`] between every handler. Split out of `main.rs` so
/// integration tests can exercise the real router end to end via
/// `tower::ServiceExt::oneshot` instead of calling handlers directly.
#[must_use]
pub fn build_router(state: Arc<AppState>) -> Router {
    routes::router().layer(tower_http::trace::TraceLayer::new_for_http()).with_state(state)
}
