//! Submitted-budget computation: regime selection and ETI aggregation.
//!
//! A project's claimable budget comes from one of three regimes:
//!
//! - `EtiDb`: live occupancy × the project's per-FTE rate, before approval.
//! - `EtiSnapshot`: snapshot occupancy × the snapshot's rate, once approved.
//! - `Real`: the itemized real cost, when no per-FTE rate is configured
//!   (rate = 0) or when an approved project's snapshot cannot be read.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::project::ProjectState;

/// Which regime produced a submitted budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComputationMode {
    EtiDb,
    EtiSnapshot,
    Real,
}

/// Which data source the budget must be computed from.
///
/// The snapshot branch is still provisional: the engine parses the blob and
/// falls back to [`BudgetBranch::RealCost`] when it is malformed or carries
/// a zero rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetBranch {
    /// Live allocations × the project's ETI rate.
    LiveEti,
    /// The frozen approval snapshot.
    Snapshot,
    /// Itemized real cost.
    RealCost,
}

/// Select the budget source. Must be applied in this order:
///
/// 1. Not approved, or approved without a stored snapshot → live data;
///    within live data, a zero ETI rate degenerates to real cost.
/// 2. Approved with a stored snapshot → the snapshot.
pub fn select_branch(state: ProjectState, has_snapshot: bool, eti_rate: Decimal) -> BudgetBranch {
    if state == ProjectState::Approved && has_snapshot {
        BudgetBranch::Snapshot
    } else if eti_rate > Decimal::ZERO {
        BudgetBranch::LiveEti
    } else {
        BudgetBranch::RealCost
    }
}

/// One year's slice of a submitted budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearBudget {
    pub year: i32,
    pub occupancy: Decimal,
    pub amount: Decimal,
}

/// A project's submitted budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmittedBudget {
    pub total: Decimal,
    /// Summed occupancy backing the total; zero in the real-cost regime.
    pub total_occupancy: Decimal,
    pub mode: ComputationMode,
    /// Per-year breakdown, ascending by year.
    pub by_year: Vec<YearBudget>,
}

impl SubmittedBudget {
    /// Aggregate an ETI-regime budget from (year, occupancy) pairs.
    ///
    /// When `year` is given, only that year's rows count toward the total
    /// and the breakdown reduces to that single year.
    pub fn from_occupancy<I>(rows: I, eti_rate: Decimal, year: Option<i32>, mode: ComputationMode) -> Self
    where
        I: IntoIterator<Item = (i32, Decimal)>,
    {
        let mut by_year: std::collections::BTreeMap<i32, Decimal> = std::collections::BTreeMap::new();
        for (row_year, occupancy) in rows {
            if year.is_none_or(|y| row_year == y) {
                *by_year.entry(row_year).or_insert(Decimal::ZERO) += occupancy;
            }
        }

        let total_occupancy: Decimal = by_year.values().copied().sum();
        let by_year = by_year
            .into_iter()
            .map(|(year, occupancy)| YearBudget {
                year,
                occupancy,
                amount: occupancy * eti_rate,
            })
            .collect();

        Self {
            total: total_occupancy * eti_rate,
            total_occupancy,
            mode,
            by_year,
        }
    }

    /// Wrap a real-cost result as the submitted budget (zero-rate regime).
    pub fn from_real_cost(total: Decimal, cost_by_year: &std::collections::BTreeMap<i32, Decimal>) -> Self {
        Self {
            total,
            total_occupancy: Decimal::ZERO,
            mode: ComputationMode::Real,
            by_year: cost_by_year
                .iter()
                .map(|(&year, &amount)| YearBudget {
                    year,
                    occupancy: Decimal::ZERO,
                    amount,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    // -- select_branch --

    #[test]
    fn pending_project_with_rate_uses_live_eti() {
        assert_eq!(
            select_branch(ProjectState::Pending, false, dec!(4500)),
            BudgetBranch::LiveEti
        );
    }

    #[test]
    fn zero_rate_degenerates_to_real_cost() {
        for state in [
            ProjectState::Draft,
            ProjectState::Pending,
            ProjectState::InDevelopment,
        ] {
            assert_eq!(
                select_branch(state, false, Decimal::ZERO),
                BudgetBranch::RealCost
            );
        }
    }

    #[test]
    fn approved_with_snapshot_reads_snapshot() {
        // Even with a live rate configured, the snapshot wins once approved.
        assert_eq!(
            select_branch(ProjectState::Approved, true, dec!(4500)),
            BudgetBranch::Snapshot
        );
        assert_eq!(
            select_branch(ProjectState::Approved, true, Decimal::ZERO),
            BudgetBranch::Snapshot
        );
    }

    #[test]
    fn approved_without_snapshot_falls_back_to_live() {
        assert_eq!(
            select_branch(ProjectState::Approved, false, dec!(4500)),
            BudgetBranch::LiveEti
        );
        assert_eq!(
            select_branch(ProjectState::Approved, false, Decimal::ZERO),
            BudgetBranch::RealCost
        );
    }

    #[test]
    fn non_approved_states_never_read_snapshot() {
        // A stale snapshot on a non-approved project is ignored.
        assert_eq!(
            select_branch(ProjectState::InDevelopment, true, dec!(4500)),
            BudgetBranch::LiveEti
        );
    }

    // -- from_occupancy --

    #[test]
    fn eti_budget_multiplies_occupancy_by_rate() {
        // Two live allocations totaling 0.75 at 4500/FTE -> 3375.
        let rows = vec![(2025, dec!(0.5)), (2025, dec!(0.25))];
        let budget =
            SubmittedBudget::from_occupancy(rows, dec!(4500), Some(2025), ComputationMode::EtiDb);

        assert_eq!(budget.total_occupancy, dec!(0.75));
        assert_eq!(budget.total, dec!(3375));
        assert_eq!(budget.mode, ComputationMode::EtiDb);
    }

    #[test]
    fn year_filter_drops_other_years() {
        let rows = vec![(2024, dec!(0.5)), (2025, dec!(0.75))];
        let budget =
            SubmittedBudget::from_occupancy(rows, dec!(1000), Some(2025), ComputationMode::EtiDb);
        assert_eq!(budget.total_occupancy, dec!(0.75));
        assert_eq!(budget.by_year.len(), 1);
        assert_eq!(budget.by_year[0].year, 2025);
    }

    #[test]
    fn by_year_breakdown_is_ascending() {
        let rows = vec![(2026, dec!(0.1)), (2024, dec!(0.2)), (2025, dec!(0.3))];
        let budget =
            SubmittedBudget::from_occupancy(rows, dec!(1000), None, ComputationMode::EtiSnapshot);
        let years: Vec<i32> = budget.by_year.iter().map(|y| y.year).collect();
        assert_eq!(years, vec![2024, 2025, 2026]);
        assert_eq!(budget.by_year[0].amount, dec!(200));
    }

    #[test]
    fn empty_rows_budget_zero() {
        let budget = SubmittedBudget::from_occupancy(
            Vec::new(),
            dec!(4500),
            None,
            ComputationMode::EtiDb,
        );
        assert_eq!(budget.total, Decimal::ZERO);
        assert!(budget.by_year.is_empty());
    }

    // -- from_real_cost --

    #[test]
    fn real_cost_budget_carries_total_and_mode() {
        let mut by_year = BTreeMap::new();
        by_year.insert(2024, dec!(1200));
        by_year.insert(2025, dec!(800));

        let budget = SubmittedBudget::from_real_cost(dec!(2000), &by_year);
        assert_eq!(budget.mode, ComputationMode::Real);
        assert_eq!(budget.total, dec!(2000));
        assert_eq!(budget.total_occupancy, Decimal::ZERO);
        assert_eq!(budget.by_year.len(), 2);
        assert_eq!(budget.by_year[1].amount, dec!(800));
    }
}
