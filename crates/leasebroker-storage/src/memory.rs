//! In-memory resource store.
//!
//! Stores all rows in a `BTreeMap` behind a single `RwLock`, keyed by
//! `"{bldg_id}\u{0}{resource_id}"`. The write lock is held for the whole
//! duration of `update_lease`/`sweep_expired`, which is what makes them
//! linearizable — no operation holds the lock across more than one backend
//! call, matching §5's "no shared mutex across more than one store call".
//!
//! Good for tests, single-node deployments, and development. All data is
//! lost when the process exits.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::model::{LeaseAssignments, LeasePreconditions, ResourceDefinition, ResourceRecord};
use crate::store::ResourceStore;

fn key(bldg_id: &str, resource_id: &str) -> String {
    format!("{bldg_id}\u{0}{resource_id}")
}

/// An in-memory resource store backed by a `BTreeMap`.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    rows: Arc<RwLock<BTreeMap<String, ResourceRecord>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ResourceStore for MemoryStore {
    async fn define(&self, definition: ResourceDefinition) -> Result<(), StoreError> {
        let k = key(&definition.bldg_id, &definition.resource_id);
        let mut rows = self.rows.write().await;
        rows.entry(k).or_insert_with(|| ResourceRecord::unleased(definition));
        Ok(())
    }

    async fn get(&self, bldg_id: &str, resource_id: &str) -> Result<ResourceRecord, StoreError> {
        let rows = self.rows.read().await;
        rows.get(&key(bldg_id, resource_id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                bldg_id: bldg_id.to_owned(),
                resource_id: resource_id.to_owned(),
            })
    }

    async fn list_all(&self) -> Result<Vec<ResourceRecord>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.values().cloned().collect())
    }

    async fn update_lease(
        &self,
        bldg_id: &str,
        resource_id: &str,
        preconditions: LeasePreconditions,
        assignments: LeaseAssignments,
    ) -> Result<ResourceRecord, StoreError> {
        let k = key(bldg_id, resource_id);
        let mut rows = self.rows.write().await;
        let row = rows.get_mut(&k).ok_or_else(|| StoreError::NotFound {
            bldg_id: bldg_id.to_owned(),
            resource_id: resource_id.to_owned(),
        })?;

        if row.locked_by != preconditions.locked_by {
            return Err(StoreError::PreconditionFailed {
                bldg_id: bldg_id.to_owned(),
                resource_id: resource_id.to_owned(),
                expected_locked_by: preconditions.locked_by,
            });
        }

        row.locked_by = assignments.locked_by;
        row.locked_time_ms = assignments.locked_time_ms;
        row.expiration_time_ms = assignments.expiration_time_ms;

        Ok(row.clone())
    }

    async fn sweep_expired(&self, now_ms: i64) -> Result<Vec<ResourceRecord>, StoreError> {
        let mut rows = self.rows.write().await;
        let mut revoked = Vec::new();

        for row in rows.values_mut() {
            if row.is_leased() && row.locked_time_ms + row.definition.max_timeout_ms < now_ms {
                revoked.push(row.clone());
                row.locked_by.clear();
                row.locked_time_ms = 0;
                row.expiration_time_ms = 0;
            }
        }

        Ok(revoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(bldg: &str, res: &str, max_timeout_ms: i64, default_timeout_ms: i64) -> ResourceDefinition {
        ResourceDefinition {
            bldg_id: bldg.to_owned(),
            resource_id: res.to_owned(),
            resource_type: crate::model::ResourceType::AllowOne,
            max_timeout_ms,
            default_timeout_ms,
        }
    }

    #[tokio::test]
    async fn get_missing_returns_not_found() {
        let store = MemoryStore::new();
        let err = store.get("B", "R").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn define_is_idempotent() {
        let store = MemoryStore::new();
        store.define(def("B", "R", 60_000, 30_000)).await.unwrap();
        store
            .update_lease(
                "B",
                "R",
                LeasePreconditions { locked_by: String::new() },
                LeaseAssignments {
                    locked_by: "robot-a".to_owned(),
                    locked_time_ms: 1_000,
                    expiration_time_ms: 31_000,
                },
            )
            .await
            .unwrap();

        // Re-running define must not reset the now-leased row.
        store.define(def("B", "R", 60_000, 30_000)).await.unwrap();
        let row = store.get("B", "R").await.unwrap();
        assert_eq!(row.locked_by, "robot-a");
    }

    #[tokio::test]
    async fn update_lease_precondition_failed() {
        let store = MemoryStore::new();
        store.define(def("B", "R", 60_000, 30_000)).await.unwrap();
        store
            .update_lease(
                "B",
                "R",
                LeasePreconditions { locked_by: String::new() },
                LeaseAssignments {
                    locked_by: "robot-a".to_owned(),
                    locked_time_ms: 1_000,
                    expiration_time_ms: 31_000,
                },
            )
            .await
            .unwrap();

        let err = store
            .update_lease(
                "B",
                "R",
                LeasePreconditions { locked_by: String::new() },
                LeaseAssignments {
                    locked_by: "robot-b".to_owned(),
                    locked_time_ms: 2_000,
                    expiration_time_ms: 32_000,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PreconditionFailed { .. }));
    }

    #[tokio::test]
    async fn sweep_expired_clears_only_past_ceiling() {
        let store = MemoryStore::new();
        store.define(def("B", "R1", 2_000, 1_000)).await.unwrap();
        store.define(def("B", "R2", 60_000, 1_000)).await.unwrap();
        for (res, locked_time) in [("R1", 0_i64), ("R2", 0_i64)] {
            store
                .update_lease(
                    "B",
                    res,
                    LeasePreconditions { locked_by: String::new() },
                    LeaseAssignments {
                        locked_by: "robot-a".to_owned(),
                        locked_time_ms: locked_time,
                        expiration_time_ms: locked_time + 1_000,
                    },
                )
                .await
                .unwrap();
        }

        let revoked = store.sweep_expired(3_000).await.unwrap();
        assert_eq!(revoked.len(), 1);
        assert_eq!(revoked[0].definition.resource_id, "R1");

        let r1 = store.get("B", "R1").await.unwrap();
        assert!(!r1.is_leased());
        let r2 = store.get("B", "R2").await.unwrap();
        assert!(r2.is_leased());
    }

    #[tokio::test]
    async fn concurrent_registration_exactly_one_wins() {
        let store = Arc::new(MemoryStore::new());
        store.define(def("B", "R", 60_000, 30_000)).await.unwrap();

        let a = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .update_lease(
                        "B",
                        "R",
                        LeasePreconditions { locked_by: String::new() },
                        LeaseAssignments {
                            locked_by: "robot-a".to_owned(),
                            locked_time_ms: 1_000,
                            expiration_time_ms: 31_000,
                        },
                    )
                    .await
            })
        };
        let b = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .update_lease(
                        "B",
                        "R",
                        LeasePreconditions { locked_by: String::new() },
                        LeaseAssignments {
                            locked_by: "robot-b".to_owned(),
                            locked_time_ms: 1_000,
                            expiration_time_ms: 31_000,
                        },
                    )
                    .await
            })
        };

        let (ra, rb) = (a.await.unwrap(), b.await.unwrap());
        let wins = [ra.is_ok(), rb.is_ok()].into_iter().filter(|x| *x).count();
        assert_eq!(wins, 1, "exactly one racing registration must win");
    }

    #[tokio::test]
    async fn list_all_returns_every_row() {
        let store = MemoryStore::new();
        store.define(def("B", "R1", 60_000, 30_000)).await.unwrap();
        store.define(def("B", "R2", 60_000, 30_000)).await.unwrap();
        let rows = store.list_all().await.unwrap();
        assert_eq!(rows.len(), 2);
    }
}
