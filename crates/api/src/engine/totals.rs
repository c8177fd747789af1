//! Financial-totals report: submitted budget and real cost combined into
//! the reportable indicators, overall and per project year.

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use grantflow_core::error::CoreError;
use grantflow_core::money::FinancingRate;
use grantflow_core::totals::{compute_totals, FinancialTotals};
use grantflow_core::types::DbId;
use grantflow_db::repositories::ProjectRepo;

use crate::engine::real_cost::CostFilters;
use crate::engine::{budget, real_cost};
use crate::error::{AppError, AppResult};

/// One project year's indicators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearTotals {
    pub year: i32,
    #[serde(flatten)]
    pub totals: FinancialTotals,
}

/// The full totals report for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalsReport {
    pub overall: FinancialTotals,
    /// Per-year breakdown over the project's date range; empty when the
    /// report was already narrowed to one year or the project has no dates.
    pub by_year: Vec<YearTotals>,
}

/// Build the totals report, optionally narrowed to one year.
pub async fn totals(pool: &PgPool, project_id: DbId, year: Option<i32>) -> AppResult<TotalsReport> {
    let project = ProjectRepo::find_by_id(pool, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;
    let rate = stored_financing_rate(project_id, project.financing_rate)?;

    let overall = totals_for(pool, project_id, year, rate).await?;

    let mut by_year = Vec::new();
    if year.is_none() {
        if let (Some(start), Some(end)) = (project.start_date, project.end_date) {
            for project_year in start.year()..=end.year() {
                let totals = totals_for(pool, project_id, Some(project_year), rate).await?;
                by_year.push(YearTotals {
                    year: project_year,
                    totals,
                });
            }
        }
    }

    Ok(TotalsReport { overall, by_year })
}

/// Decode the rate stored on the project row.
///
/// The column is CHECK-constrained to 0..=1, so an out-of-range value is
/// corrupt server data: surfaced as an internal error (500), never as a
/// caller-facing validation failure on a read endpoint.
fn stored_financing_rate(project_id: DbId, value: Decimal) -> AppResult<FinancingRate> {
    FinancingRate::from_fraction(value).map_err(|_| {
        AppError::Core(CoreError::Internal(format!(
            "Project {project_id} has out-of-range financing rate {value}"
        )))
    })
}

async fn totals_for(
    pool: &PgPool,
    project_id: DbId,
    year: Option<i32>,
    rate: FinancingRate,
) -> AppResult<FinancialTotals> {
    let submitted = budget::submitted_budget(pool, project_id, year).await?;
    let filters = CostFilters {
        year,
        workpackage_id: None,
    };
    let real = real_cost::real_cost(pool, project_id, filters).await?;
    Ok(compute_totals(submitted.total, &real, rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    // -- stored_financing_rate --

    #[test]
    fn in_range_rate_decodes() {
        let rate = stored_financing_rate(1, dec!(0.8)).unwrap();
        assert_eq!(rate.as_fraction(), dec!(0.8));
    }

    #[test]
    fn out_of_range_rate_is_an_internal_error_not_a_caller_fault() {
        let err = stored_financing_rate(1, dec!(1.5)).unwrap_err();
        assert!(matches!(
            err,
            AppError::Core(CoreError::Internal(ref msg)) if msg.contains("1.5")
        ));
    }
}
