//! Real (incurred) cost accumulation.
//!
//! Staff cost applies the institutional salary-load formula to each
//! allocation row; material cost is unit price times quantity. The
//! realized/projected split treats allocations as realized strictly before
//! the current month and materials as realized when their acquired flag is
//! set, independent of date.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Salary-load constants
// ---------------------------------------------------------------------------

/// Employer-side load applied to the base monthly salary (social charges).
pub const SALARY_LOAD_FACTOR: Decimal = dec!(1.223);
/// Salary payments per year: 12 months plus the two "subsidio" payments.
pub const PAYMENTS_PER_YEAR: Decimal = dec!(14);
/// Working months the annual cost is amortized over.
pub const WORKING_MONTHS_PER_YEAR: Decimal = dec!(11);

/// Fully-loaded monthly cost of a person, from their nominal base salary.
///
/// `base × 1.223 × 14 / 11`: the annual 14-payment cost with social charges,
/// spread over 11 working months.
pub fn adjusted_monthly_salary(base_salary: Decimal) -> Decimal {
    base_salary * SALARY_LOAD_FACTOR * PAYMENTS_PER_YEAR / WORKING_MONTHS_PER_YEAR
}

// ---------------------------------------------------------------------------
// Input rows
// ---------------------------------------------------------------------------

/// An allocation row joined with its user's salary, as fetched for costing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffCostRow {
    pub user_id: DbId,
    pub month: i16,
    pub year: i32,
    pub occupancy: Decimal,
    /// `None` means the person contributes no cost.
    pub monthly_salary: Option<Decimal>,
}

/// A material line item, as fetched for costing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialCostRow {
    pub unit_price: Decimal,
    pub quantity: i32,
    /// Expense category tag ("rubrica").
    pub category: String,
    pub usage_year: i32,
    pub acquired: bool,
}

impl StaffCostRow {
    /// Cost contributed by this row: occupancy times the loaded salary.
    fn cost(&self) -> Decimal {
        match self.monthly_salary {
            Some(salary) => self.occupancy * adjusted_monthly_salary(salary),
            None => Decimal::ZERO,
        }
    }
}

impl MaterialCostRow {
    fn cost(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

// ---------------------------------------------------------------------------
// Real cost
// ---------------------------------------------------------------------------

/// Actual/incurred cost for a project (or a workpackage/year slice of it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RealCost {
    pub resource_cost: Decimal,
    pub material_cost: Decimal,
    pub total: Decimal,
    /// Staff cost per user.
    pub by_user: BTreeMap<DbId, Decimal>,
    /// Material cost per category ("rubrica").
    pub by_category: BTreeMap<String, Decimal>,
}

/// Accumulate the real cost over the given rows.
///
/// Materials count regardless of their acquired flag; the flag only matters
/// for the realized/projected split below.
pub fn real_cost(staff: &[StaffCostRow], materials: &[MaterialCostRow]) -> RealCost {
    let mut resource_cost = Decimal::ZERO;
    let mut by_user: BTreeMap<DbId, Decimal> = BTreeMap::new();
    for row in staff {
        let cost = row.cost();
        if cost.is_zero() {
            continue;
        }
        resource_cost += cost;
        *by_user.entry(row.user_id).or_insert(Decimal::ZERO) += cost;
    }

    let mut material_cost = Decimal::ZERO;
    let mut by_category: BTreeMap<String, Decimal> = BTreeMap::new();
    for row in materials {
        let cost = row.cost();
        material_cost += cost;
        *by_category
            .entry(row.category.clone())
            .or_insert(Decimal::ZERO) += cost;
    }

    RealCost {
        resource_cost,
        material_cost,
        total: resource_cost + material_cost,
        by_user,
        by_category,
    }
}

/// Total cost per year: staff rows keyed by allocation year, materials by
/// usage year. Used for per-year budget breakdowns in the real-cost regime.
pub fn cost_by_year(
    staff: &[StaffCostRow],
    materials: &[MaterialCostRow],
) -> BTreeMap<i32, Decimal> {
    let mut by_year: BTreeMap<i32, Decimal> = BTreeMap::new();
    for row in staff {
        *by_year.entry(row.year).or_insert(Decimal::ZERO) += row.cost();
    }
    for row in materials {
        *by_year.entry(row.usage_year).or_insert(Decimal::ZERO) += row.cost();
    }
    by_year
}

// ---------------------------------------------------------------------------
// Realized / projected split
// ---------------------------------------------------------------------------

/// Cost partitioned into already-incurred and still-projected halves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RealizedSplit {
    pub realized: Decimal,
    pub projected: Decimal,
}

/// Whether (year, month) lies strictly before the month of `today`.
///
/// The current month itself always counts as not yet realized.
pub fn is_realized_month(year: i32, month: i16, today: NaiveDate) -> bool {
    (year, u32::from(month as u16)) < (today.year(), today.month())
}

/// Split staff cost on the month cutoff.
pub fn staff_cost_split(staff: &[StaffCostRow], today: NaiveDate) -> RealizedSplit {
    let mut realized = Decimal::ZERO;
    let mut projected = Decimal::ZERO;
    for row in staff {
        if is_realized_month(row.year, row.month, today) {
            realized += row.cost();
        } else {
            projected += row.cost();
        }
    }
    RealizedSplit {
        realized,
        projected,
    }
}

/// Split material cost on the acquired flag, independent of date.
pub fn material_cost_split(materials: &[MaterialCostRow]) -> RealizedSplit {
    let mut realized = Decimal::ZERO;
    let mut projected = Decimal::ZERO;
    for row in materials {
        if row.acquired {
            realized += row.cost();
        } else {
            projected += row.cost();
        }
    }
    RealizedSplit {
        realized,
        projected,
    }
}
