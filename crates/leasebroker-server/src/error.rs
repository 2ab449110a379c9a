//! HTTP error types for the lease broker server.
//!
//! Domain-level outcomes (`SUCCESS`/`FAILURE`/`OTHERS`/`EMERGENCY`) ride
//! inside a `200 OK` response body's `result` field — they are never
//! expressed as HTTP error codes. [`AppError`] exists only for failures
//! outside that protocol: a malformed envelope, or a backend fault on a
//! debug endpoint that has no domain-result field to carry it in.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use leasebroker_storage::StoreError;

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// The request body did not decode against the expected envelope.
    BadRequest(String),
    /// An uncategorized backend failure, per §4.6/§7 — only reachable from
    /// endpoints with no domain-result field of their own (`/api/all_data`).
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        (status, axum::Json(ErrorBody { error: error_type, message })).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::BadRequest(err.to_string()),
            StoreError::PreconditionFailed { .. } => Self::BadRequest(err.to_string()),
            StoreError::Backend { .. } => Self::Internal(err.to_string()),
        }
    }
}
