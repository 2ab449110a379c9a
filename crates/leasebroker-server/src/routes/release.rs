//! `POST /api/release`, per §4.4.2 and §6.1.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use leasebroker_core::engine::{release, ReleaseRequest};
use leasebroker_core::Clock;

use crate::state::AppState;
use crate::wire::{recover_str, ReleaseRequestWire, ReleaseResponseWire};

const EXPECTED_API: &str = "Release";

pub async fn handler(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<serde_json::Value>,
) -> (StatusCode, Json<ReleaseResponseWire>) {
    let wire: ReleaseRequestWire = match serde_json::from_value(raw.clone()) {
        Ok(w) if w.api == EXPECTED_API => w,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ReleaseResponseWire {
                    api: "ReleaseResult",
                    result: 3, // OTHERS
                    request_id: recover_str(&raw, "request_id"),
                    timestamp: state.clock.now(),
                    resource_id: recover_str(&raw, "resource_id"),
                }),
            );
        }
    };

    let outcome = release(
        state.store.as_ref(),
        &ReleaseRequest { bldg_id: wire.bldg_id, resource_id: wire.resource_id, robot_id: wire.robot_id },
    )
    .await;

    (
        StatusCode::OK,
        Json(ReleaseResponseWire {
            api: "ReleaseResult",
            result: outcome.result.code(),
            request_id: wire.request_id,
            timestamp: state.clock.now(),
            resource_id: outcome.resource_id,
        }),
    )
}
