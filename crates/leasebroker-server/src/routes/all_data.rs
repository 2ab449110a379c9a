//! `GET /api/all_data`, per §6.1 — a debug enumeration of every resource row.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;
use crate::wire::ResourceRecordWire;

pub async fn handler(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ResourceRecordWire>>, AppError> {
    let rows = state.store.list_all().await?;
    Ok(Json(rows.into_iter().map(ResourceRecordWire::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use leasebroker_core::SystemClock;
    use leasebroker_storage::{MemoryStore, ResourceDefinition, ResourceType};

    #[tokio::test]
    async fn lists_every_seeded_row_flattened() {
        let store = MemoryStore::new();
        store
            .define(ResourceDefinition {
                bldg_id: "B".into(),
                resource_id: "R".into(),
                resource_type: ResourceType::AllowOne,
                max_timeout_ms: 60_000,
                default_timeout_ms: 30_000,
            })
            .await
            .unwrap();
        let state = Arc::new(AppState { store: Arc::new(store), clock: Arc::new(SystemClock) });

        let Json(rows) = handler(State(state)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bldg_id, "B");
        assert_eq!(rows[0].resource_id, "R");
        assert_eq!(rows[0].locked_by, "");
    }
}
