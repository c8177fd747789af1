//! Real-cost queries: fetch allocation and material rows for a project and
//! feed them to the costing formulas.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use grantflow_core::costing::{
    self, MaterialCostRow, RealCost, RealizedSplit, StaffCostRow,
};
use grantflow_core::error::CoreError;
use grantflow_core::types::DbId;
use grantflow_db::repositories::{AllocationRepo, MaterialRepo, ProjectRepo};

use crate::error::{AppError, AppResult};

/// Optional narrowing of a cost query to one year and/or one workpackage.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CostFilters {
    pub year: Option<i32>,
    pub workpackage_id: Option<DbId>,
}

/// Realized-versus-projected spend for a project slice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostProgress {
    pub staff: RealizedSplit,
    pub materials: RealizedSplit,
    pub realized_total: Decimal,
    pub projected_total: Decimal,
}

/// Compute the real (incurred plus planned) cost for a project.
pub async fn real_cost(
    pool: &PgPool,
    project_id: DbId,
    filters: CostFilters,
) -> AppResult<RealCost> {
    ensure_project_exists(pool, project_id).await?;
    let (staff, materials) = fetch_cost_rows(pool, project_id, filters).await?;
    Ok(costing::real_cost(&staff, &materials))
}

/// Split a project's cost into realized and projected halves.
///
/// Staff rows split on whether their month lies strictly before the current
/// month; materials split on their acquired flag.
pub async fn cost_progress(
    pool: &PgPool,
    project_id: DbId,
    filters: CostFilters,
) -> AppResult<CostProgress> {
    ensure_project_exists(pool, project_id).await?;
    let (staff_rows, material_rows) = fetch_cost_rows(pool, project_id, filters).await?;

    let today = Utc::now().date_naive();
    let staff = costing::staff_cost_split(&staff_rows, today);
    let materials = costing::material_cost_split(&material_rows);

    Ok(CostProgress {
        realized_total: staff.realized + materials.realized,
        projected_total: staff.projected + materials.projected,
        staff,
        materials,
    })
}

/// Fetch the costing input rows for a project.
pub(crate) async fn fetch_cost_rows(
    pool: &PgPool,
    project_id: DbId,
    filters: CostFilters,
) -> AppResult<(Vec<StaffCostRow>, Vec<MaterialCostRow>)> {
    let staff = AllocationRepo::find_for_project_with_salary(
        pool,
        project_id,
        filters.year,
        filters.workpackage_id,
    )
    .await?
    .into_iter()
    .map(|row| StaffCostRow {
        user_id: row.user_id,
        month: row.month,
        year: row.year,
        occupancy: row.occupancy,
        monthly_salary: row.monthly_salary,
    })
    .collect();

    let materials =
        MaterialRepo::find_for_project(pool, project_id, filters.year, filters.workpackage_id)
            .await?
            .into_iter()
            .map(|row| MaterialCostRow {
                unit_price: row.unit_price,
                quantity: row.quantity,
                category: row.category,
                usage_year: row.usage_year,
                acquired: row.acquired,
            })
            .collect();

    Ok((staff, materials))
}

pub(crate) async fn ensure_project_exists(pool: &PgPool, project_id: DbId) -> AppResult<()> {
    ProjectRepo::find_by_id(pool, project_id)
        .await?
        .map(|_| ())
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))
}
