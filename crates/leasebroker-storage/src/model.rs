//! Row shapes for the resource store.
//!
//! `ResourceDefinition` is the immutable part of a row (seeded once at
//! bootstrap); `ResourceRecord` adds the mutable lease fields on top. The
//! store never exposes these as opaque bytes — every backend reads and
//! writes the fields directly, since `update_lease`'s preconditions and
//! assignments are field-level (see [`LeasePreconditions`],
//! [`LeaseAssignments`]).

use serde::{Deserialize, Serialize};

/// Resource kind. Only one variant exists today; the field is carried
/// through so a future kind (e.g. partial/fractional leases) has a place
/// to land without a schema migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ResourceType {
    AllowOne = 1,
}

/// The immutable definition of a leasable resource, as seeded from the
/// bootstrap YAML (§6.2). Identity is `(bldg_id, resource_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub bldg_id: String,
    pub resource_id: String,
    pub resource_type: ResourceType,
    /// Absolute ceiling on any single lease, in milliseconds.
    pub max_timeout_ms: i64,
    /// Timeout substituted when a client requests `timeout == 0`.
    pub default_timeout_ms: i64,
}

/// A resource row: its definition plus the current lease state.
///
/// Invariant I1: `locked_by == ""` iff `locked_time_ms == 0` iff
/// `expiration_time_ms == 0`. Invariant I2: when leased,
/// `locked_time_ms <= expiration_time_ms <= locked_time_ms + max_timeout_ms`.
/// Both invariants are maintained by every `ResourceStore` implementation —
/// callers never construct a record that violates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub definition: ResourceDefinition,
    /// Current holder; empty string means unleased.
    pub locked_by: String,
    /// Server timestamp (ms) the current lease began; 0 when unleased.
    pub locked_time_ms: i64,
    /// Server timestamp (ms) the current lease expires unless renewed;
    /// 0 when unleased. Advisory for clients — see §4.5.
    pub expiration_time_ms: i64,
}

impl ResourceRecord {
    /// Build the initial (unleased) row for a freshly seeded definition.
    #[must_use]
    pub fn unleased(definition: ResourceDefinition) -> Self {
        Self {
            definition,
            locked_by: String::new(),
            locked_time_ms: 0,
            expiration_time_ms: 0,
        }
    }

    #[must_use]
    pub fn is_leased(&self) -> bool {
        !self.locked_by.is_empty()
    }
}

/// Precondition checked by [`ResourceStore::update_lease`] before applying
/// an update. The store contract only ever needs an equality check on
/// `locked_by` (§4.2) — Registration requires it empty, Release and
/// RobotStatus=CANCEL require it equal to the caller's `robot_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeasePreconditions {
    pub locked_by: String,
}

/// Field assignments applied atomically when preconditions hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseAssignments {
    pub locked_by: String,
    pub locked_time_ms: i64,
    pub expiration_time_ms: i64,
}

impl LeaseAssignments {
    /// The assignment that clears a lease back to the unleased state.
    #[must_use]
    pub fn release() -> Self {
        Self {
            locked_by: String::new(),
            locked_time_ms: 0,
            expiration_time_ms: 0,
        }
    }
}
