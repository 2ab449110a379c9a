//! JSON wire shapes for the HTTP API, per §6.1.
//!
//! Every request carries an `api` discriminator that must match the
//! endpoint it was posted to; every response echoes `request_id` and
//! stamps a fresh server `timestamp`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegistrationRequestWire {
    pub api: String,
    pub bldg_id: String,
    pub resource_id: String,
    pub robot_id: String,
    pub timeout: i64,
    pub request_id: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct RegistrationResponseWire {
    pub api: &'static str,
    pub result: i32,
    pub request_id: String,
    pub timestamp: i64,
    pub max_expiration_time: i64,
    pub expiration_time: i64,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseRequestWire {
    pub api: String,
    pub bldg_id: String,
    pub resource_id: String,
    pub robot_id: String,
    pub request_id: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct ReleaseResponseWire {
    pub api: &'static str,
    pub result: i32,
    pub request_id: String,
    pub timestamp: i64,
    pub resource_id: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequestWire {
    pub api: String,
    pub bldg_id: String,
    pub resource_id: String,
    pub request_id: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponseWire {
    pub api: &'static str,
    pub result: i32,
    pub request_id: String,
    pub timestamp: i64,
    pub resource_id: String,
    pub resource_state: i32,
    pub robot_id: String,
    pub max_expiration_time: i64,
    pub expiration_time: i64,
}

#[derive(Debug, Deserialize)]
pub struct RobotStatusRequestWire {
    pub api: String,
    pub robot_id: String,
    pub resource_id: String,
    pub state: i32,
    /// `RobotStateDetail` (`NORMAL=0`/`ERROR=1`) on the wire — reserved,
    /// unused by the engine, per §4.4.4. Kept integer-typed to match the
    /// original `RobotStatusPayload.state_detail` enum.
    #[serde(default)]
    pub state_detail: Option<i32>,
    pub request_id: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
pub struct RobotStatusResponseWire {
    pub api: &'static str,
    pub result: i32,
    pub request_id: String,
    pub timestamp: i64,
}

/// A single row of `GET /api/all_data`'s debug enumeration. Flattened from
/// storage's nested `ResourceRecord { definition, .. }` to mirror the flat
/// `resource_operator` table row the original implementation returns as-is.
#[derive(Debug, Serialize)]
pub struct ResourceRecordWire {
    pub bldg_id: String,
    pub resource_id: String,
    pub resource_type: i32,
    pub max_timeout_ms: i64,
    pub default_timeout_ms: i64,
    pub locked_by: String,
    pub locked_time_ms: i64,
    pub expiration_time_ms: i64,
}

impl From<leasebroker_storage::ResourceRecord> for ResourceRecordWire {
    fn from(row: leasebroker_storage::ResourceRecord) -> Self {
        Self {
            bldg_id: row.definition.bldg_id,
            resource_id: row.definition.resource_id,
            resource_type: row.definition.resource_type as i32,
            max_timeout_ms: row.definition.max_timeout_ms,
            default_timeout_ms: row.definition.default_timeout_ms,
            locked_by: row.locked_by,
            locked_time_ms: row.locked_time_ms,
            expiration_time_ms: row.expiration_time_ms,
        }
    }
}

/// Best-effort extraction for the 400-response path: a malformed or
/// wrong-discriminator payload still echoes `request_id`/`resource_id`
/// when they happen to be present and string-typed, per §4.4's
/// "Validation failure" note.
pub fn recover_str(raw: &serde_json::Value, field: &str) -> String {
    raw.get(field).and_then(serde_json::Value::as_str).unwrap_or_default().to_owned()
}
