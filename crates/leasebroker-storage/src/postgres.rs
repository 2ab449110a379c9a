//! PostgreSQL-backed resource store.
//!
//! Stores one row per `(bldg_id, resource_id)` in a `resources` table.
//! Compare-and-swap is implemented with a `WHERE locked_by = $n` clause on
//! the `UPDATE`, so two concurrent `update_lease` calls against the same
//! row are linearized by Postgres's own row-level locking — no
//! `SELECT ... FOR UPDATE` is needed for that path. `sweep_expired` does use
//! `FOR UPDATE` (via a CTE) since it must read-then-clear a whole batch of
//! rows as one atomic step.
//!
//! Feature-gated behind `postgres-backend`. Uses `sqlx` with the Tokio
//! runtime, matching the rest of this workspace's async story.

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use crate::error::StoreError;
use crate::model::{
    LeaseAssignments, LeasePreconditions, ResourceDefinition, ResourceRecord, ResourceType,
};
use crate::store::ResourceStore;

/// A resource store backed by PostgreSQL.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore").field("pool", &"[PgPool]").finish_non_exhaustive()
    }
}

impl PostgresStore {
    /// Connect to PostgreSQL and create the `resources` table if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the connection or migration fails.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Backend { reason: format!("connect failed: {e}") })?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS resources (
                bldg_id TEXT NOT NULL,
                resource_id TEXT NOT NULL,
                resource_type INTEGER NOT NULL,
                max_timeout_ms BIGINT NOT NULL,
                default_timeout_ms BIGINT NOT NULL,
                locked_by TEXT NOT NULL DEFAULT '',
                locked_time_ms BIGINT NOT NULL DEFAULT 0,
                expiration_time_ms BIGINT NOT NULL DEFAULT 0,
                PRIMARY KEY (bldg_id, resource_id)
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::Backend { reason: format!("migration failed: {e}") })?;

        Ok(Self { pool })
    }

    fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<ResourceRecord, StoreError> {
        let resource_type_int: i32 = row
            .try_get("resource_type")
            .map_err(|e| StoreError::Backend { reason: e.to_string() })?;
        let resource_type = match resource_type_int {
            1 => ResourceType::AllowOne,
            other => {
                return Err(StoreError::Backend {
                    reason: format!("unknown resource_type {other}"),
                })
            }
        };

        Ok(ResourceRecord {
            definition: ResourceDefinition {
                bldg_id: row.try_get("bldg_id").map_err(|e| StoreError::Backend { reason: e.to_string() })?,
                resource_id: row
                    .try_get("resource_id")
                    .map_err(|e| StoreError::Backend { reason: e.to_string() })?,
                resource_type,
                max_timeout_ms: row
                    .try_get("max_timeout_ms")
                    .map_err(|e| StoreError::Backend { reason: e.to_string() })?,
                default_timeout_ms: row
                    .try_get("default_timeout_ms")
                    .map_err(|e| StoreError::Backend { reason: e.to_string() })?,
            },
            locked_by: row.try_get("locked_by").map_err(|e| StoreError::Backend { reason: e.to_string() })?,
            locked_time_ms: row
                .try_get("locked_time_ms")
                .map_err(|e| StoreError::Backend { reason: e.to_string() })?,
            expiration_time_ms: row
                .try_get("expiration_time_ms")
                .map_err(|e| StoreError::Backend { reason: e.to_string() })?,
        })
    }
}

#[async_trait::async_trait]
impl ResourceStore for PostgresStore {
    async fn define(&self, definition: ResourceDefinition) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO resources
                (bldg_id, resource_id, resource_type, max_timeout_ms, default_timeout_ms)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (bldg_id, resource_id) DO NOTHING",
        )
        .bind(&definition.bldg_id)
        .bind(&definition.resource_id)
        .bind(definition.resource_type as i32)
        .bind(definition.max_timeout_ms)
        .bind(definition.default_timeout_ms)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend { reason: format!("define failed: {e}") })?;

        Ok(())
    }

    async fn get(&self, bldg_id: &str, resource_id: &str) -> Result<ResourceRecord, StoreError> {
        let row = sqlx::query("SELECT * FROM resources WHERE bldg_id = $1 AND resource_id = $2")
            .bind(bldg_id)
            .bind(resource_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend { reason: format!("get failed: {e}") })?
            .ok_or_else(|| StoreError::NotFound {
                bldg_id: bldg_id.to_owned(),
                resource_id: resource_id.to_owned(),
            })?;

        Self::row_to_record(&row)
    }

    async fn list_all(&self) -> Result<Vec<ResourceRecord>, StoreError> {
        let rows = sqlx::query("SELECT * FROM resources ORDER BY bldg_id, resource_id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend { reason: format!("list_all failed: {e}") })?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn update_lease(
        &self,
        bldg_id: &str,
        resource_id: &str,
        preconditions: LeasePreconditions,
        assignments: LeaseAssignments,
    ) -> Result<ResourceRecord, StoreError> {
        let updated = sqlx::query(
            "UPDATE resources
             SET locked_by = $1, locked_time_ms = $2, expiration_time_ms = $3
             WHERE bldg_id = $4 AND resource_id = $5 AND locked_by = $6
             RETURNING *",
        )
        .bind(&assignments.locked_by)
        .bind(assignments.locked_time_ms)
        .bind(assignments.expiration_time_ms)
        .bind(bldg_id)
        .bind(resource_id)
        .bind(&preconditions.locked_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend { reason: format!("update_lease failed: {e}") })?;

        if let Some(row) = updated {
            return Self::row_to_record(&row);
        }

        // No row matched the WHERE clause. Disambiguate NOT_FOUND from
        // PRECONDITION_FAILED with a follow-up read, per §4.2.
        match self.get(bldg_id, resource_id).await {
            Ok(_) => Err(StoreError::PreconditionFailed {
                bldg_id: bldg_id.to_owned(),
                resource_id: resource_id.to_owned(),
                expected_locked_by: preconditions.locked_by,
            }),
            Err(e) => Err(e),
        }
    }

    async fn sweep_expired(&self, now_ms: i64) -> Result<Vec<ResourceRecord>, StoreError> {
        let rows = sqlx::query(
            "WITH expired AS (
                SELECT bldg_id, resource_id, resource_type, max_timeout_ms,
                       default_timeout_ms, locked_by, locked_time_ms, expiration_time_ms
                FROM resources
                WHERE locked_by <> '' AND locked_time_ms + max_timeout_ms < $1
                FOR UPDATE
             )
             UPDATE resources r
             SET locked_by = '', locked_time_ms = 0, expiration_time_ms = 0
             FROM expired e
             WHERE r.bldg_id = e.bldg_id AND r.resource_id = e.resource_id
             RETURNING e.bldg_id, e.resource_id, e.resource_type, e.max_timeout_ms,
                       e.default_timeout_ms, e.locked_by, e.locked_time_ms, e.expiration_time_ms",
        )
        .bind(now_ms)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend { reason: format!("sweep_expired failed: {e}") })?;

        rows.iter().map(Self::row_to_record).collect()
    }
}
