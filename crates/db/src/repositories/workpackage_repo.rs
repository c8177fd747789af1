//! Repository for the `workpackages` table.

use grantflow_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::workpackage::{CreateWorkpackage, UpdateWorkpackage, Workpackage};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, project_id, name, completed, start_date, end_date, created_at, updated_at";

/// Provides CRUD operations for workpackages.
pub struct WorkpackageRepo;

impl WorkpackageRepo {
    /// Insert a new workpackage, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateWorkpackage,
    ) -> Result<Workpackage, sqlx::Error> {
        let query = format!(
            "INSERT INTO workpackages (project_id, name, start_date, end_date)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workpackage>(&query)
            .bind(input.project_id)
            .bind(&input.name)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_one(pool)
            .await
    }

    /// Find a workpackage by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Workpackage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workpackages WHERE id = $1");
        sqlx::query_as::<_, Workpackage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's workpackages, oldest first.
    ///
    /// Executor-generic so the approval snapshot can capture through its
    /// own transaction.
    pub async fn list_for_project<'e>(
        executor: impl PgExecutor<'e>,
        project_id: DbId,
    ) -> Result<Vec<Workpackage>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM workpackages WHERE project_id = $1 ORDER BY id");
        sqlx::query_as::<_, Workpackage>(&query)
            .bind(project_id)
            .fetch_all(executor)
            .await
    }

    /// Update a workpackage. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWorkpackage,
    ) -> Result<Option<Workpackage>, sqlx::Error> {
        let query = format!(
            "UPDATE workpackages SET
                name = COALESCE($2, name),
                completed = COALESCE($3, completed),
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workpackage>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.completed)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_optional(pool)
            .await
    }

    /// Delete a workpackage by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM workpackages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
