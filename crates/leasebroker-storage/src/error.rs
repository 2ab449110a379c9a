//! Storage error types.
//!
//! Every error variant carries enough context to diagnose the problem
//! without a debugger, following the same convention the rest of this
//! workspace uses for its `thiserror` enums.

/// Errors that can occur during resource store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No row exists for the given `(bldg_id, resource_id)` key.
    #[error("resource not found: {bldg_id}/{resource_id}")]
    NotFound { bldg_id: String, resource_id: String },

    /// `update_lease`'s preconditions did not match the row's current value.
    #[error("precondition failed for {bldg_id}/{resource_id}: expected locked_by '{expected_locked_by}'")]
    PreconditionFailed {
        bldg_id: String,
        resource_id: String,
        expected_locked_by: String,
    },

    /// Any other backend fault: connection failure, serialization failure,
    /// disk error. Classified as `BACKEND_FAILURE` per the store contract.
    #[error("storage backend failure: {reason}")]
    Backend { reason: String },
}
