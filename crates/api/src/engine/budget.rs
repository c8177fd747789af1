//! Submitted-budget orchestration.
//!
//! Loads the project, selects the computation regime, and aggregates the
//! budget from the matching data source. A malformed approval snapshot is
//! logged and absorbed by falling back to the real-cost regime; it never
//! fails the request.

use sqlx::PgPool;

use grantflow_core::budget::{select_branch, BudgetBranch, ComputationMode, SubmittedBudget};
use grantflow_core::costing;
use grantflow_core::error::CoreError;
use grantflow_core::snapshot::ApprovalSnapshot;
use grantflow_core::types::DbId;
use grantflow_db::repositories::{AllocationRepo, ProjectRepo};

use crate::engine::real_cost::{fetch_cost_rows, CostFilters};
use crate::error::{AppError, AppResult};

/// Compute a project's submitted budget, optionally for a single year.
pub async fn submitted_budget(
    pool: &PgPool,
    project_id: DbId,
    year: Option<i32>,
) -> AppResult<SubmittedBudget> {
    let project = ProjectRepo::find_by_id(pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;
    let state = project.state()?;

    match select_branch(state, project.approved_snapshot.is_some(), project.eti_rate) {
        BudgetBranch::LiveEti => {
            let rows = AllocationRepo::find_for_project(pool, project_id, year, None).await?;
            Ok(SubmittedBudget::from_occupancy(
                rows.into_iter().map(|row| (row.year, row.occupancy)),
                project.eti_rate,
                year,
                ComputationMode::EtiDb,
            ))
        }
        BudgetBranch::Snapshot => {
            // select_branch only picks this branch when a snapshot is stored.
            let Some(blob) = &project.approved_snapshot else {
                return real_cost_budget(pool, project_id, year).await;
            };
            match ApprovalSnapshot::parse(blob) {
                // A snapshot frozen with a zero rate budgets by itemized
                // cost, same as the live zero-rate regime.
                Ok(snapshot) if snapshot.eti_rate.is_zero() => {
                    real_cost_budget(pool, project_id, year).await
                }
                Ok(snapshot) => Ok(SubmittedBudget::from_occupancy(
                    snapshot.resources().map(|r| (r.year, r.occupancy)),
                    snapshot.eti_rate,
                    year,
                    ComputationMode::EtiSnapshot,
                )),
                Err(error) => {
                    tracing::warn!(
                        project_id,
                        %error,
                        "Stored approval snapshot is unreadable, computing budget from real cost"
                    );
                    real_cost_budget(pool, project_id, year).await
                }
            }
        }
        BudgetBranch::RealCost => real_cost_budget(pool, project_id, year).await,
    }
}

/// Budget under the real-cost regime: the itemized cost is the budget.
async fn real_cost_budget(
    pool: &PgPool,
    project_id: DbId,
    year: Option<i32>,
) -> AppResult<SubmittedBudget> {
    let filters = CostFilters {
        year,
        workpackage_id: None,
    };
    let (staff, materials) = fetch_cost_rows(pool, project_id, filters).await?;
    let cost = costing::real_cost(&staff, &materials);
    let by_year = costing::cost_by_year(&staff, &materials);
    Ok(SubmittedBudget::from_real_cost(cost.total, &by_year))
}
