//! Error types for `leasebroker-core`.

use leasebroker_storage::StoreError;

/// Errors the lease engine can raise.
///
/// Decode/validation failures are deliberately absent here — per §4.4's
/// "Validation failure" note, those are caught at the router boundary,
/// before an engine call is ever made.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The resource store returned an error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from loading the bootstrap YAML, per §4.7.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// `RESOURCE_YAML_PATH` was not set.
    #[error("RESOURCE_YAML_PATH is not set")]
    MissingPath,

    /// The file could not be read.
    #[error("failed to read '{path}': {reason}")]
    Read { path: String, reason: String },

    /// The file did not parse as the expected YAML shape.
    #[error("failed to parse '{path}': {reason}")]
    Parse { path: String, reason: String },

    /// An entry had a non-positive timeout (§3 I4).
    #[error("resource '{resource_id}' has non-positive timeout: {field} = {value}")]
    NonPositiveTimeout { resource_id: String, field: &'static str, value: i64 },

    /// Seeding the store failed.
    #[error("failed to seed resource '{resource_id}': {reason}")]
    Seed { resource_id: String, reason: String },
}
