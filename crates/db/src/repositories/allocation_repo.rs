//! Repository for the `allocations` table.
//!
//! The write path for allocations is validated against the 100%-occupancy
//! ceiling before any insert/update, so the methods that feed the validator
//! accept any `PgExecutor`: the engine runs them against the pool for plain
//! reads and against an open transaction (with the bucket's advisory lock
//! held) when a write is about to happen.

use grantflow_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::allocation::{Allocation, AllocationKey, StaffAllocationRow, UpsertAllocation};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, workpackage_id, user_id, month, year, occupancy, created_at, updated_at";

/// Advisory-lock key for a (user, month, year) bucket.
///
/// Packs the low 32 bits of the user id with year and month. Truncating the
/// user id can collide two far-apart users onto one key; a collision only
/// serializes unrelated writers, it never admits an invalid write.
fn bucket_lock_key(user_id: DbId, month: i16, year: i32) -> i64 {
    ((user_id & 0xFFFF_FFFF) << 32) | ((i64::from(year) & 0xFFFF) << 16) | (i64::from(month) & 0xFFFF)
}

/// Provides read/write operations for allocation rows.
pub struct AllocationRepo;

impl AllocationRepo {
    /// Every allocation row for one (user, month, year) bucket, across all
    /// workpackages including the leave bucket.
    pub async fn find_for_user_month<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
        month: i16,
        year: i32,
    ) -> Result<Vec<Allocation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM allocations
             WHERE user_id = $1 AND month = $2 AND year = $3
             ORDER BY id"
        );
        sqlx::query_as::<_, Allocation>(&query)
            .bind(user_id)
            .bind(month)
            .bind(year)
            .fetch_all(executor)
            .await
    }

    /// Serialize writers on a (user, month, year) bucket.
    ///
    /// Must run inside a transaction. Row locks cannot cover a bucket that
    /// has no rows yet, so the write path takes a transaction-scoped
    /// advisory lock on the bucket key before summing committed occupancy;
    /// every writer takes the same lock, so two requests cannot both read
    /// a stale sum and both commit. Released automatically at
    /// commit/rollback.
    pub async fn lock_bucket<'e>(
        executor: impl PgExecutor<'e>,
        user_id: DbId,
        month: i16,
        year: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(bucket_lock_key(user_id, month, year))
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Every allocation row under a project, optionally narrowed to one
    /// year and/or one workpackage. Leave rows never match (they have no
    /// workpackage and thus no project).
    pub async fn find_for_project(
        pool: &PgPool,
        project_id: DbId,
        year: Option<i32>,
        workpackage_id: Option<DbId>,
    ) -> Result<Vec<Allocation>, sqlx::Error> {
        let query = "SELECT a.id, a.workpackage_id, a.user_id, a.month, a.year, a.occupancy, \
                a.created_at, a.updated_at
             FROM allocations a
             JOIN workpackages w ON w.id = a.workpackage_id
             WHERE w.project_id = $1
               AND ($2::INTEGER IS NULL OR a.year = $2)
               AND ($3::BIGINT IS NULL OR a.workpackage_id = $3)
             ORDER BY a.id";
        sqlx::query_as::<_, Allocation>(query)
            .bind(project_id)
            .bind(year)
            .bind(workpackage_id)
            .fetch_all(pool)
            .await
    }

    /// Project allocations joined with each user's salary, for costing and
    /// snapshot capture.
    pub async fn find_for_project_with_salary<'e>(
        executor: impl PgExecutor<'e>,
        project_id: DbId,
        year: Option<i32>,
        workpackage_id: Option<DbId>,
    ) -> Result<Vec<StaffAllocationRow>, sqlx::Error> {
        let query = "SELECT a.user_id, a.month, a.year, a.occupancy, u.monthly_salary
             FROM allocations a
             JOIN workpackages w ON w.id = a.workpackage_id
             JOIN users u ON u.id = a.user_id
             WHERE w.project_id = $1
               AND ($2::INTEGER IS NULL OR a.year = $2)
               AND ($3::BIGINT IS NULL OR a.workpackage_id = $3)
             ORDER BY a.id";
        sqlx::query_as::<_, StaffAllocationRow>(query)
            .bind(project_id)
            .bind(year)
            .bind(workpackage_id)
            .fetch_all(executor)
            .await
    }

    /// Insert or update the row at the natural key.
    ///
    /// The caller is responsible for having validated the ceiling first,
    /// inside the same transaction when `executor` is one.
    pub async fn upsert<'e>(
        executor: impl PgExecutor<'e>,
        input: &UpsertAllocation,
    ) -> Result<Allocation, sqlx::Error> {
        let query = format!(
            "INSERT INTO allocations (workpackage_id, user_id, month, year, occupancy)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (workpackage_id, user_id, month, year)
             DO UPDATE SET occupancy = EXCLUDED.occupancy, updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Allocation>(&query)
            .bind(input.workpackage_id)
            .bind(input.user_id)
            .bind(input.month)
            .bind(input.year)
            .bind(input.occupancy)
            .fetch_one(executor)
            .await
    }

    /// Delete the row at the natural key. Returns `true` if a row was removed.
    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        key: &AllocationKey,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM allocations
             WHERE workpackage_id IS NOT DISTINCT FROM $1
               AND user_id = $2 AND month = $3 AND year = $4",
        )
        .bind(key.workpackage_id)
        .bind(key.user_id)
        .bind(key.month)
        .bind(key.year)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
