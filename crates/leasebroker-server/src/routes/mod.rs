//! HTTP route handlers for the lease broker.
//!
//! One module per endpoint, matching §6.1's table:
//! - `registration`: `POST /api/registration`
//! - `release`: `POST /api/release`
//! - `status`: `POST /api/request_resource_status`
//! - `robot_status`: `POST /api/robot_status`
//! - `all_data`: `GET /api/all_data` (debug enumeration)

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub mod all_data;
pub mod registration;
pub mod release;
pub mod robot_status;
pub mod status;

/// Build the `/api` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/registration", post(registration::handler))
        .route("/api/release", post(release::handler))
        .route("/api/request_resource_status", post(status::handler))
        .route("/api/robot_status", post(robot_status::handler))
        .route("/api/all_data", get(all_data::handler))
}
