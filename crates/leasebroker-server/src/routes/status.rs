//! `POST /api/request_resource_status`, per §4.4.3 and §6.1.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use leasebroker_core::engine::{request_resource_status, ResourceState, StatusRequest};
use leasebroker_core::Clock;

use crate::state::AppState;
use crate::wire::{recover_str, StatusRequestWire, StatusResponseWire};

const EXPECTED_API: &str = "RequestResourceStatus";

pub async fn handler(
    State(state): State<Arc<AppState>>,
    Json(raw): Json<serde_json::Value>,
) -> (StatusCode, Json<StatusResponseWire>) {
    let wire: StatusRequestWire = match serde_json::from_value(raw.clone()) {
        Ok(w) if w.api == EXPECTED_API => w,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(StatusResponseWire {
                    api: "ResourceStatus",
                    result: 3, // OTHERS
                    request_id: recover_str(&raw, "request_id"),
                    timestamp: state.clock.now(),
                    resource_id: recover_str(&raw, "resource_id"),
                    resource_state: ResourceState::Unknown.code(),
                    robot_id: String::new(),
                    max_expiration_time: 0,
                    expiration_time: 0,
                }),
            );
        }
    };

    let resource_id = wire.resource_id.clone();
    let outcome =
        request_resource_status(state.store.as_ref(), &StatusRequest { bldg_id: wire.bldg_id, resource_id }).await;

    (
        StatusCode::OK,
        Json(StatusResponseWire {
            api: "ResourceStatus",
            result: outcome.result.code(),
            request_id: wire.request_id,
            timestamp: state.clock.now(),
            resource_id: wire.resource_id,
            resource_state: outcome.resource_state.code(),
            robot_id: outcome.robot_id,
            max_expiration_time: outcome.max_expiration_ms,
            expiration_time: outcome.expiration_ms,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use leasebroker_core::{Clock, SystemClock};
    use leasebroker_storage::{MemoryStore, ResourceDefinition, ResourceType};

    fn test_state() -> Arc<AppState> {
        Arc::new(AppState { store: Arc::new(MemoryStore::new()), clock: Arc::new(SystemClock) })
    }

    #[tokio::test]
    async fn unknown_resource_is_failure_unknown_state() {
        let state = test_state();
        let body = serde_json::json!({
            "api": "RequestResourceStatus", "bldg_id": "B", "resource_id": "nope",
            "request_id": "rq", "timestamp": state.clock.now()
        });
        let (status, Json(resp)) = handler(State(state), Json(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp.result, 2); // FAILURE
        assert_eq!(resp.resource_state, 99); // UNKNOWN
    }

    #[tokio::test]
    async fn unleased_resource_is_available() {
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
        let body = serde_json::json!({
            "api": "RequestResourceStatus", "bldg_id": "B", "resource_id": "R",
            "request_id": "rq", "timestamp": state.clock.now()
        });
        let (_, Json(resp)) = handler(State(state), Json(body)).await;
        assert_eq!(resp.result, 1);
        assert_eq!(resp.resource_state, 0); // AVAILABLE
    }
}
