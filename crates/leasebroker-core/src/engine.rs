//! The lease engine, per §4.4 — the state machine behind all four
//! client-visible operations. The engine itself is stateless (§5): every
//! call borrows a [`ResourceStore`] and a [`Clock`]; all shared state lives
//! in the store.

use leasebroker_storage::{LeaseAssignments, LeasePreconditions, ResourceStore, StoreError};
use tracing::{info, warn};

use crate::clock::Clock;
use crate::policy::{self, PolicyViolation};

/// The semantic outcome of an engine call, independent of HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseResult {
    Success = 1,
    Failure = 2,
    Others = 3,
    #[allow(dead_code)] // reserved, never emitted — see §7
    Emergency = 99,
}

impl LeaseResult {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// `resource_state` in a `RequestResourceStatus` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    Available = 0,
    Occupied = 1,
    Unknown = 99,
}

impl ResourceState {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// `state` in a `RobotStatus` request, per §4.4.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotState {
    Entering = 0,
    Exited = 1,
    Cancel = 3,
    Using = 6,
}

// ── Registration ─────────────────────────────────────────────────────

pub struct RegistrationRequest {
    pub bldg_id: String,
    pub resource_id: String,
    pub robot_id: String,
    /// Requested timeout in milliseconds; `0` substitutes the resource's
    /// default.
    pub timeout_ms: i64,
    /// Client-supplied lease anchor, used as `locked_time_ms` — see the
    /// note in §4.4.1: this is intentional, not a bug.
    pub timestamp_ms: i64,
}

pub struct RegistrationOutcome {
    pub result: LeaseResult,
    pub max_expiration_ms: i64,
    pub expiration_ms: i64,
}

/// §4.4.1 Registration. Store-backend faults are folded into `Others`
/// rather than propagated, matching §4.6's "no client-visible 5xx for a
/// domain-level operation" rule.
pub async fn registration(
    store: &dyn ResourceStore,
    clock: &dyn Clock,
    req: &RegistrationRequest,
) -> RegistrationOutcome {
    let existing = match store.get(&req.bldg_id, &req.resource_id).await {
        Ok(row) => row,
        Err(StoreError::NotFound { .. }) => {
            return RegistrationOutcome { result: LeaseResult::Others, max_expiration_ms: 0, expiration_ms: 0 };
        }
        Err(e) => {
            warn!(error = %e, bldg_id = %req.bldg_id, resource_id = %req.resource_id, "registration: store error");
            return RegistrationOutcome { result: LeaseResult::Others, max_expiration_ms: 0, expiration_ms: 0 };
        }
    };

    if existing.is_leased() {
        return RegistrationOutcome { result: LeaseResult::Failure, max_expiration_ms: 0, expiration_ms: 0 };
    }

    let expiration_ms = match policy::compute_expiration(
        req.timestamp_ms,
        existing.definition.default_timeout_ms,
        existing.definition.max_timeout_ms,
        req.timeout_ms,
        clock.now(),
    ) {
        Ok(exp) => exp,
        Err(PolicyViolation::ExceedsMaxTimeout | PolicyViolation::AlreadyExpired) => {
            return RegistrationOutcome { result: LeaseResult::Others, max_expiration_ms: 0, expiration_ms: 0 };
        }
    };

    let assignments = LeaseAssignments {
        locked_by: req.robot_id.clone(),
        locked_time_ms: req.timestamp_ms,
        expiration_time_ms: expiration_ms,
    };
    let preconditions = LeasePreconditions { locked_by: String::new() };

    match store.update_lease(&req.bldg_id, &req.resource_id, preconditions, assignments).await {
        Ok(_) => {
            info!(
                bldg_id = %req.bldg_id, resource_id = %req.resource_id, robot_id = %req.robot_id,
                expiration_ms, "resource leased"
            );
            RegistrationOutcome {
                result: LeaseResult::Success,
                max_expiration_ms: policy::max_expiration(req.timestamp_ms, existing.definition.max_timeout_ms),
                expiration_ms,
            }
        }
        Err(StoreError::PreconditionFailed { .. }) => {
            RegistrationOutcome { result: LeaseResult::Failure, max_expiration_ms: 0, expiration_ms: 0 }
        }
        Err(e) => {
            warn!(error = %e, "registration: update_lease failed");
            RegistrationOutcome { result: LeaseResult::Others, max_expiration_ms: 0, expiration_ms: 0 }
        }
    }
}

// ── Release ──────────────────────────────────────────────────────────

pub struct ReleaseRequest {
    pub bldg_id: String,
    pub resource_id: String,
    pub robot_id: String,
}

pub struct ReleaseOutcome {
    pub result: LeaseResult,
    pub resource_id: String,
}

/// §4.4.2 Release.
pub async fn release(store: &dyn ResourceStore, req: &ReleaseRequest) -> ReleaseOutcome {
    let existing = match store.get(&req.bldg_id, &req.resource_id).await {
        Ok(row) => row,
        Err(StoreError::NotFound { .. }) => {
            return ReleaseOutcome { result: LeaseResult::Failure, resource_id: req.resource_id.clone() };
        }
        Err(e) => {
            warn!(error = %e, "release: store error");
            return ReleaseOutcome { result: LeaseResult::Others, resource_id: req.resource_id.clone() };
        }
    };

    // The unleased case and the wrong-holder case are intentionally not
    // distinguished (§4.4.2 step 2).
    if existing.locked_by != req.robot_id {
        return ReleaseOutcome { result: LeaseResult::Failure, resource_id: req.resource_id.clone() };
    }

    let preconditions = LeasePreconditions { locked_by: req.robot_id.clone() };
    match store
        .update_lease(&req.bldg_id, &req.resource_id, preconditions, LeaseAssignments::release())
        .await
    {
        Ok(_) => {
            info!(bldg_id = %req.bldg_id, resource_id = %req.resource_id, robot_id = %req.robot_id, "resource released");
            ReleaseOutcome { result: LeaseResult::Success, resource_id: req.resource_id.clone() }
        }
        Err(StoreError::PreconditionFailed { .. }) => {
            ReleaseOutcome { result: LeaseResult::Failure, resource_id: req.resource_id.clone() }
        }
        Err(e) => {
            warn!(error = %e, "release: update_lease failed");
            ReleaseOutcome { result: LeaseResult::Others, resource_id: req.resource_id.clone() }
        }
    }
}

// ── RequestResourceStatus ────────────────────────────────────────────

pub struct StatusRequest {
    pub bldg_id: String,
    pub resource_id: String,
}

pub struct StatusOutcome {
    pub result: LeaseResult,
    pub resource_state: ResourceState,
    pub robot_id: String,
    pub expiration_ms: i64,
    pub max_expiration_ms: i64,
}

/// §4.4.3 RequestResourceStatus. A pure read; never mutates the store.
pub async fn request_resource_status(store: &dyn ResourceStore, req: &StatusRequest) -> StatusOutcome {
    let row = match store.get(&req.bldg_id, &req.resource_id).await {
        Ok(row) => row,
        Err(StoreError::NotFound { .. }) => {
            return StatusOutcome {
                result: LeaseResult::Failure,
                resource_state: ResourceState::Unknown,
                robot_id: String::new(),
                expiration_ms: 0,
                max_expiration_ms: 0,
            };
        }
        Err(e) => {
            warn!(error = %e, "request_resource_status: store error");
            return StatusOutcome {
                result: LeaseResult::Others,
                resource_state: ResourceState::Unknown,
                robot_id: String::new(),
                expiration_ms: 0,
                max_expiration_ms: 0,
            };
        }
    };

    if !row.is_leased() {
        return StatusOutcome {
            result: LeaseResult::Success,
            resource_state: ResourceState::Available,
            robot_id: String::new(),
            expiration_ms: 0,
            max_expiration_ms: 0,
        };
    }

    StatusOutcome {
        result: LeaseResult::Success,
        resource_state: ResourceState::Occupied,
        robot_id: row.locked_by.clone(),
        expiration_ms: row.expiration_time_ms,
        max_expiration_ms: policy::max_expiration(row.locked_time_ms, row.definition.max_timeout_ms),
    }
}

// ── RobotStatus ──────────────────────────────────────────────────────

pub struct RobotStatusRequest {
    pub robot_id: String,
    pub resource_id: String,
    pub state: RobotState,
}

pub struct RobotStatusOutcome {
    pub result: LeaseResult,
}

/// §4.4.4 RobotStatus. Only `Cancel` is actionable; every other state is a
/// reserved no-op — this is intentional forward-compatibility, not a gap.
pub async fn robot_status(store: &dyn ResourceStore, req: &RobotStatusRequest) -> RobotStatusOutcome {
    if req.state != RobotState::Cancel {
        return RobotStatusOutcome { result: LeaseResult::Success };
    }

    let row = match store.get_by_holder(&req.robot_id).await {
        Some(row) => row,
        None => return RobotStatusOutcome { result: LeaseResult::Failure },
    };

    let preconditions = LeasePreconditions { locked_by: req.robot_id.clone() };
    match store
        .update_lease(&row.definition.bldg_id, &row.definition.resource_id, preconditions, LeaseAssignments::release())
        .await
    {
        Ok(_) => {
            info!(robot_id = %req.robot_id, resource_id = %req.resource_id, "robot cancelled, resource released");
            RobotStatusOutcome { result: LeaseResult::Success }
        }
        Err(StoreError::PreconditionFailed { .. }) => RobotStatusOutcome { result: LeaseResult::Failure },
        Err(e) => {
            warn!(error = %e, "robot_status: update_lease failed");
            RobotStatusOutcome { result: LeaseResult::Others }
        }
    }
}

/// Extension used only by `robot_status`: find the unique row currently
/// held by `robot_id`. §4.2 only mandates keyed `get`/`list_all`/
/// `update_lease`/`sweep_expired`; this is implemented on top of
/// `list_all` rather than widening the store trait, since no backend needs
/// a specialized index for a lookup this rare.
#[async_trait::async_trait]
pub trait HolderLookup {
    async fn get_by_holder(&self, robot_id: &str) -> Option<leasebroker_storage::ResourceRecord>;
}

#[async_trait::async_trait]
impl HolderLookup for dyn ResourceStore {
    async fn get_by_holder(&self, robot_id: &str) -> Option<leasebroker_storage::ResourceRecord> {
        let rows = self.list_all().await.ok()?;
        rows.into_iter().find(|r| r.locked_by == robot_id)
    }
}
