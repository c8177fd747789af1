//! Repository for the `materials` table.

use grantflow_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::material::{CreateMaterial, Material, UpdateMaterial};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, workpackage_id, name, unit_price, quantity, category, usage_year, \
     usage_month, acquired, created_at, updated_at";

/// Provides CRUD operations and costing queries for materials.
pub struct MaterialRepo;

impl MaterialRepo {
    /// Insert a new material, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateMaterial) -> Result<Material, sqlx::Error> {
        let query = format!(
            "INSERT INTO materials (workpackage_id, name, unit_price, quantity, category, usage_year, usage_month)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Material>(&query)
            .bind(input.workpackage_id)
            .bind(&input.name)
            .bind(input.unit_price)
            .bind(input.quantity)
            .bind(&input.category)
            .bind(input.usage_year)
            .bind(input.usage_month)
            .fetch_one(pool)
            .await
    }

    /// Find a material by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Material>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM materials WHERE id = $1");
        sqlx::query_as::<_, Material>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a workpackage's materials, oldest first.
    ///
    /// Executor-generic so the approval snapshot can capture through its
    /// own transaction.
    pub async fn list_for_workpackage<'e>(
        executor: impl PgExecutor<'e>,
        workpackage_id: DbId,
    ) -> Result<Vec<Material>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM materials WHERE workpackage_id = $1 ORDER BY id");
        sqlx::query_as::<_, Material>(&query)
            .bind(workpackage_id)
            .fetch_all(executor)
            .await
    }

    /// Fetch every material under a project, optionally narrowed to one
    /// usage year and/or one workpackage. Feeds the real-cost calculator.
    pub async fn find_for_project(
        pool: &PgPool,
        project_id: DbId,
        year: Option<i32>,
        workpackage_id: Option<DbId>,
    ) -> Result<Vec<Material>, sqlx::Error> {
        let query = "SELECT m.id, m.workpackage_id, m.name, m.unit_price, m.quantity, m.category, \
                m.usage_year, m.usage_month, m.acquired, m.created_at, m.updated_at
             FROM materials m
             JOIN workpackages w ON w.id = m.workpackage_id
             WHERE w.project_id = $1
               AND ($2::INTEGER IS NULL OR m.usage_year = $2)
               AND ($3::BIGINT IS NULL OR m.workpackage_id = $3)
             ORDER BY m.id";
        sqlx::query_as::<_, Material>(query)
            .bind(project_id)
            .bind(year)
            .bind(workpackage_id)
            .fetch_all(pool)
            .await
    }

    /// Update a material. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMaterial,
    ) -> Result<Option<Material>, sqlx::Error> {
        let query = format!(
            "UPDATE materials SET
                name = COALESCE($2, name),
                unit_price = COALESCE($3, unit_price),
                quantity = COALESCE($4, quantity),
                category = COALESCE($5, category),
                usage_year = COALESCE($6, usage_year),
                usage_month = COALESCE($7, usage_month),
                acquired = COALESCE($8, acquired),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Material>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.unit_price)
            .bind(input.quantity)
            .bind(&input.category)
            .bind(input.usage_year)
            .bind(input.usage_month)
            .bind(input.acquired)
            .fetch_optional(pool)
            .await
    }

    /// Delete a material by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM materials WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
