//! Financial indicator formulas.
//!
//! Combines a submitted budget and a real cost into the reportable
//! indicators. Formula order matters and all operands are `Decimal`:
//!
//! ```text
//! financed_value      = submitted_budget × financing_rate
//! overhead            = resource_cost × (−0.15)
//! result              = financed_value − real_total + overhead
//! vab                 = financed_value − material_cost
//! margin              = result / submitted_budget × 100   (0 when budget is 0)
//! vab_over_staff_cost = vab / resource_cost               (0 when staff cost is 0)
//! slack               = submitted_budget − real_total + overhead
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::costing::RealCost;
use crate::money::{safe_div, FinancingRate};

/// Fixed overhead penalty applied to staff cost. Distinct from the
/// informational `overhead_pct` stored on the project row.
pub const OVERHEAD_RATE: Decimal = dec!(0.15);

/// The reportable financial indicators for a project (or one year of it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinancialTotals {
    pub submitted_budget: Decimal,
    pub real_cost: Decimal,
    pub resource_cost: Decimal,
    pub material_cost: Decimal,
    pub financed_value: Decimal,
    /// Always zero or negative: a penalty on staff cost.
    pub overhead: Decimal,
    pub result: Decimal,
    pub vab: Decimal,
    /// Percentage (0..100 scale); zero when the submitted budget is zero.
    pub margin: Decimal,
    /// Ratio; zero when there is no staff cost.
    pub vab_over_staff_cost: Decimal,
    pub slack: Decimal,
}

/// Apply the indicator formulas.
pub fn compute_totals(
    submitted_budget: Decimal,
    real: &RealCost,
    rate: FinancingRate,
) -> FinancialTotals {
    let financed_value = submitted_budget * rate.as_fraction();
    let overhead = real.resource_cost * -OVERHEAD_RATE;
    let result = financed_value - real.total + overhead;
    let vab = financed_value - real.material_cost;
    let margin = safe_div(result, submitted_budget) * dec!(100);
    let vab_over_staff_cost = safe_div(vab, real.resource_cost);
    let slack = submitted_budget - real.total + overhead;

    FinancialTotals {
        submitted_budget,
        real_cost: real.total,
        resource_cost: real.resource_cost,
        material_cost: real.material_cost,
        financed_value,
        overhead,
        result,
        vab,
        margin,
        vab_over_staff_cost,
        slack,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn real(resource_cost: Decimal, material_cost: Decimal) -> RealCost {
        RealCost {
            resource_cost,
            material_cost,
            total: resource_cost + material_cost,
            by_user: BTreeMap::new(),
            by_category: BTreeMap::new(),
        }
    }

    #[test]
    fn formulas_applied_in_order() {
        // submitted 10000 at 80% financing, 4000 staff + 1000 materials.
        let rate = FinancingRate::from_fraction(dec!(0.8)).unwrap();
        let totals = compute_totals(dec!(10000), &real(dec!(4000), dec!(1000)), rate);

        assert_eq!(totals.financed_value, dec!(8000));
        assert_eq!(totals.overhead, dec!(-600)); // 4000 × −0.15
        assert_eq!(totals.result, dec!(2400)); // 8000 − 5000 − 600
        assert_eq!(totals.vab, dec!(7000)); // 8000 − 1000
        assert_eq!(totals.margin, dec!(24)); // 2400 / 10000 × 100
        assert_eq!(totals.vab_over_staff_cost, dec!(1.75)); // 7000 / 4000
        assert_eq!(totals.slack, dec!(4400)); // 10000 − 5000 − 600
    }

    #[test]
    fn zero_budget_margin_is_zero() {
        let rate = FinancingRate::from_fraction(dec!(0.8)).unwrap();
        let totals = compute_totals(Decimal::ZERO, &real(dec!(500), dec!(100)), rate);
        assert_eq!(totals.margin, Decimal::ZERO);
    }

    #[test]
    fn zero_staff_cost_ratio_is_zero() {
        let rate = FinancingRate::from_fraction(dec!(0.8)).unwrap();
        let totals = compute_totals(dec!(1000), &real(Decimal::ZERO, dec!(100)), rate);
        assert_eq!(totals.vab_over_staff_cost, Decimal::ZERO);
        assert_eq!(totals.overhead, Decimal::ZERO);
    }

    #[test]
    fn overspent_project_has_negative_slack() {
        let rate = FinancingRate::from_fraction(Decimal::ONE).unwrap();
        let totals = compute_totals(dec!(1000), &real(dec!(2000), Decimal::ZERO), rate);
        // 1000 − 2000 − 300
        assert_eq!(totals.slack, dec!(-1300));
        assert!(totals.result < Decimal::ZERO);
    }

    #[test]
    fn everything_zero_stays_zero() {
        let rate = FinancingRate::from_fraction(Decimal::ZERO).unwrap();
        let totals = compute_totals(Decimal::ZERO, &real(Decimal::ZERO, Decimal::ZERO), rate);
        assert_eq!(totals.result, Decimal::ZERO);
        assert_eq!(totals.margin, Decimal::ZERO);
        assert_eq!(totals.vab_over_staff_cost, Decimal::ZERO);
    }
}
