//! The [`ResourceStore`] trait — a durable keyed mapping from
//! `(bldg_id, resource_id)` to a [`ResourceRecord`] with atomic
//! read-modify-write, per §4.2.
//!
//! Every engine-visible mutation goes through `update_lease`, which applies
//! `assignments` iff the row's current `locked_by` matches
//! `preconditions.locked_by`. This is the single compare-and-swap operation
//! the whole lease engine is built on — there is no other way to mutate a
//! row's lease fields. Implementations must make `update_lease` and
//! `sweep_expired` linearizable: two concurrent callers racing on the same
//! key must see a total order, with exactly one observing its precondition
//! hold.

use crate::error::StoreError;
use crate::model::{LeaseAssignments, LeasePreconditions, ResourceDefinition, ResourceRecord};

/// A pluggable, linearizable store for resource lease state.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait ResourceStore: Send + Sync + 'static {
    /// Seed a resource definition. Idempotent: if a row already exists for
    /// `(bldg_id, resource_id)`, it is left untouched (lease state and all)
    /// — this is what lets a restart re-run the bootstrapper without
    /// dropping in-flight leases (§9).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the underlying backend fails.
    async fn define(&self, definition: ResourceDefinition) -> Result<(), StoreError>;

    /// Fetch the current row for `(bldg_id, resource_id)`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no such row exists, or
    /// [`StoreError::Backend`] on backend failure.
    async fn get(&self, bldg_id: &str, resource_id: &str) -> Result<ResourceRecord, StoreError>;

    /// Enumerate every row, for debug enumeration (`GET /api/all_data`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] on backend failure.
    async fn list_all(&self) -> Result<Vec<ResourceRecord>, StoreError>;

    /// Atomically apply `assignments` to the row at `(bldg_id, resource_id)`
    /// iff its current `locked_by` equals `preconditions.locked_by`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if no such row exists.
    /// - [`StoreError::PreconditionFailed`] if the row's current `locked_by`
    ///   does not match `preconditions.locked_by`.
    /// - [`StoreError::Backend`] on any other backend fault.
    async fn update_lease(
        &self,
        bldg_id: &str,
        resource_id: &str,
        preconditions: LeasePreconditions,
        assignments: LeaseAssignments,
    ) -> Result<ResourceRecord, StoreError>;

    /// Atomically find every row where `locked_by != ""` and
    /// `locked_time_ms + definition.max_timeout_ms < now_ms`, clear it back
    /// to the unleased state, and return the prior (leased) state of each
    /// row that was cleared.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] on backend failure. A failed sweep
    /// leaves every row untouched — the caller retries on the next tick.
    async fn sweep_expired(&self, now_ms: i64) -> Result<Vec<ResourceRecord>, StoreError>;
}
