//! Background lease expiry sweeper, per §4.5.
//!
//! Runs independently of any client request: every tick it asks the store
//! to clear rows past their ceiling and logs what it revoked. Clients only
//! ever learn a lease died because a later call observes the resource
//! unleased — there is no push notification (§4.5, open question resolved
//! in DESIGN.md).

use std::sync::Arc;
use std::time::Duration;

use leasebroker_storage::ResourceStore;
use tokio::time::interval;
use tracing::{info, warn};

use crate::clock::Clock;

/// Default sweep period. Overridable via `LEASEBROKER_SWEEP_INTERVAL_MS`
/// (see `ServerConfig`).
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 1_000;

/// Runs `sweep_expired` on a fixed interval until `shutdown` fires.
///
/// Intended to be spawned as its own task alongside the HTTP server; it
/// shares the same store so a sweep and an in-flight request never race
/// outside of the store's own linearizability guarantee.
pub async fn run(
    store: Arc<dyn ResourceStore>,
    clock: Arc<dyn Clock>,
    period: Duration,
    mut shutdown: tokio::sync::watch::Receiver<bool>,
) {
    let mut ticker = interval(period);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                sweep_once(store.as_ref(), clock.as_ref()).await;
            }
            _ = shutdown.changed() => {
                info!("expirer: shutdown signal received, stopping");
                break;
            }
        }
    }
}

async fn sweep_once(store: &dyn ResourceStore, clock: &dyn Clock) {
    match store.sweep_expired(clock.now()).await {
        Ok(revoked) if revoked.is_empty() => {}
        Ok(revoked) => {
            for row in &revoked {
                info!(
                    bldg_id = %row.definition.bldg_id,
                    resource_id = %row.definition.resource_id,
                    robot_id = %row.locked_by,
                    locked_time_ms = row.locked_time_ms,
                    "lease expired, revoked by sweeper"
                );
            }
        }
        Err(e) => {
            warn!(error = %e, "expirer: sweep failed, will retry next tick");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;
    use leasebroker_storage::{
        LeaseAssignments, LeasePreconditions, MemoryStore, ResourceDefinition, ResourceType,
    };

    #[tokio::test]
    async fn sweep_once_clears_expired_rows() {
        let store = MemoryStore::new();
        store
            .define(ResourceDefinition {
                bldg_id: "B".into(),
                resource_id: "R".into(),
                resource_type: ResourceType::AllowOne,
                max_timeout_ms: 1_000,
                default_timeout_ms: 1_000,
            })
            .await
            .unwrap();
        store
            .update_lease(
                "B",
                "R",
                LeasePreconditions { locked_by: String::new() },
                LeaseAssignments { locked_by: "robot-a".into(), locked_time_ms: 0, expiration_time_ms: 1_000 },
            )
            .await
            .unwrap();

        let clock = VirtualClock::new(5_000);
        sweep_once(&store, &clock).await;

        let row = store.get("B", "R").await.unwrap();
        assert!(!row.is_leased());
    }
}
