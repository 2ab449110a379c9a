//! `POST /api/robot_status`, per §4.4.4 and §6.1.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use leasebroker_core::engine::{robot_status, RobotState, RobotStatusRequest};
use leasebroker_core::Clock;

use crate::state::AppState;
use crate::wire::{recover_str, RobotStatusRequestWire, RobotStatusResponseWire};

const EXPECTED_API: &str = "RobotStatus";

/// Map the wire integer onto [`RobotState`]. Any code other than `CANCEL`
/// (3) is treated as a reserved no-op, per §4.4.4 and §9 — including codes
/// the wire format does not define, so a forward-compatible client cannot
/// accidentally trigger a release.
fn robot_state_from_wire(code: i32) -> RobotState {
    match code {
        1 => RobotState::Exited,
        3 => RobotState::Cancel,
        6 => RobotState::Using,
        _ => RobotState::Entering,
    }
}

pub async fn handler(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<serde_json::Value>,
) -> (StatusCode, Json<RobotStatusResponseWire>) {
    let wire: RobotStatusRequestWire = match serde_json::from_value(raw.clone()) {
        Ok(w) if w.api == EXPECTED_API => w,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(RobotStatusResponseWire {
                    api: "RobotStatusResult",
                    result: 3, // OTHERS
                    request_id: recover_str(&raw, "request_id"),
                    timestamp: state.clock.now(),
                }),
            );
        }
    };

    let outcome = robot_status(
        state.store.as_ref(),
        &RobotStatusRequest {
            robot_id: wire.robot_id,
            resource_id: wire.resource_id,
            state: robot_state_from_wire(wire.state),
        },
    )
    .await;

    (
        StatusCode::OK,
        Json(RobotStatusResponseWire {
            api: "RobotStatusResult",
            result: outcome.result.code(),
            request_id: wire.request_id,
            timestamp: state.clock.now(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use leasebroker_core::engine::{registration, RegistrationRequest};
    use leasebroker_core::{Clock, SystemClock};
    use leasebroker_storage::{MemoryStore, ResourceDefinition, ResourceType};

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState { store: Arc::new(MemoryStore::new()), clock: Arc::new(SystemClock) })
    }

    #[tokio::test]
    async fn cancel_releases_and_other_states_are_inert() {
        let state = test_state();
        state
            .store
            .define(ResourceDefinition {
                bldg_id: "B".into(),
                resource_id: "R".into(),
                resource_type: ResourceType::AllowOne,
                max_timeout_ms: 60_000,
                default_timeout_ms: 30_000,
            })
            .await
            .unwrap();
        let now = state.clock.now();
        registration(
            state.store.as_ref(),
            state.clock.as_ref(),
            &RegistrationRequest {
                bldg_id: "B".into(),
                resource_id: "R".into(),
                robot_id: "A".into(),
                timeout_ms: 0,
                timestamp_ms: now,
            },
        )
        .await;

        let entering = serde_json::json!({
            "api": "RobotStatus", "robot_id": "A", "resource_id": "R",
            "state": 0, "request_id": "rq", "timestamp": now
        });
        let (_, Json(resp)) = handler(State(Arc::clone(&state)), Json(entering)).await;
        assert_eq!(resp.result, 1);

        let row = state.store.get("B", "R").await.unwrap();
        assert!(row.is_leased(), "ENTERING must not release the resource");

        let cancel = serde_json::json!({
            "api": "RobotStatus", "robot_id": "A", "resource_id": "R",
            "state": 3, "request_id": "rq", "timestamp": now
        });
        let (_, Json(resp)) = handler(State(Arc::clone(&state)), Json(cancel)).await;
        assert_eq!(resp.result, 1);

        let row = state.store.get("B", "R").await.unwrap();
        assert!(!row.is_leased());
    }
}
