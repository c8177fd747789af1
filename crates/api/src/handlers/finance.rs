//! Financial read endpoints: budget, real cost, progress, totals.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use grantflow_core::budget::SubmittedBudget;
use grantflow_core::costing::RealCost;
use grantflow_core::types::DbId;

use crate::engine::real_cost::{CostFilters, CostProgress};
use crate::engine::totals::TotalsReport;
use crate::engine::{budget, real_cost, totals as totals_engine};
use crate::error::AppResult;
use crate::state::AppState;

/// Optional year narrowing for budget and totals queries.
#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

/// GET /projects/{id}/budget?year=
pub async fn submitted_budget(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(query): Query<YearQuery>,
) -> AppResult<Json<SubmittedBudget>> {
    let budget = budget::submitted_budget(&state.pool, id, query.year).await?;
    Ok(Json(budget))
}

/// GET /projects/{id}/real-cost?year=&workpackage_id=
pub async fn real_cost(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(filters): Query<CostFilters>,
) -> AppResult<Json<RealCost>> {
    let cost = real_cost::real_cost(&state.pool, id, filters).await?;
    Ok(Json(cost))
}

/// GET /projects/{id}/cost-progress?year=&workpackage_id=
pub async fn cost_progress(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(filters): Query<CostFilters>,
) -> AppResult<Json<CostProgress>> {
    let progress = real_cost::cost_progress(&state.pool, id, filters).await?;
    Ok(Json(progress))
}

/// GET /projects/{id}/totals?year=
pub async fn totals(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(query): Query<YearQuery>,
) -> AppResult<Json<TotalsReport>> {
    let report = totals_engine::totals(&state.pool, id, query.year).await?;
    Ok(Json(report))
}
