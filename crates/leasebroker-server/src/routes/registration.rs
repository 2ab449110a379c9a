//! `POST /api/registration`, per §4.4.1 and §6.1.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use leasebroker_core::engine::{registration, RegistrationRequest};
use leasebroker_core::Clock;

use crate::state::AppState;
use crate::wire::{recover_str, RegistrationRequestWire, RegistrationResponseWire};

const EXPECTED_API: &str = "Registration";

pub async fn handler(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<serde_json::Value>,
) -> (StatusCode, Json<RegistrationResponseWire>) {
    let wire: RegistrationRequestWire = match serde_json::from_value(raw.clone()) {
        Ok(w) if w.api == EXPECTED_API => w,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(RegistrationResponseWire {
                    api: "RegistrationResult",
                    result: 3, // OTHERS
                    request_id: recover_str(&raw, "request_id"),
                    timestamp: state.clock.now(),
                    max_expiration_time: 0,
                    expiration_time: 0,
                }),
            );
        }
    };

    let outcome = registration(
        state.store.as_ref(),
        state.clock.as_ref(),
        &RegistrationRequest {
            bldg_id: wire.bldg_id,
            resource_id: wire.resource_id,
            robot_id: wire.robot_id,
            timeout_ms: wire.timeout,
            timestamp_ms: wire.timestamp,
        },
    )
    .await;

    (
        StatusCode::OK,
        Json(RegistrationResponseWire {
            api: "RegistrationResult",
            result: outcome.result.code(),
            request_id: wire.request_id,
            timestamp: state.clock.now(),
            max_expiration_time: outcome.max_expiration_ms,
            expiration_time: outcome.expiration_ms,
        }),
    )
}
