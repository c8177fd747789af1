//! Decimal money helpers.
//!
//! Every monetary, percentage, and occupancy value in this system is a
//! [`rust_decimal::Decimal`]. Binary floating point is only acceptable at the
//! serialization boundary, and even there the `Decimal` serde representation
//! is preferred.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::CoreError;

/// One hundred, for percent <-> fraction conversion.
const HUNDRED: Decimal = dec!(100);

/// A project financing rate, held canonically as a 0..=1 fraction.
///
/// Upstream data sources carry this value inconsistently as either a
/// fraction (`0.85`) or a percentage (`85`). All internal arithmetic uses
/// the fraction; callers holding a percentage must go through
/// [`FinancingRate::from_percent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct FinancingRate(Decimal);

impl FinancingRate {
    /// Build a rate from a 0..=1 fraction.
    pub fn from_fraction(fraction: Decimal) -> Result<Self, CoreError> {
        if fraction < Decimal::ZERO || fraction > Decimal::ONE {
            return Err(CoreError::Validation(format!(
                "Financing rate fraction must be within 0..=1, got {fraction}"
            )));
        }
        Ok(Self(fraction))
    }

    /// Build a rate from a 0..=100 percentage.
    pub fn from_percent(percent: Decimal) -> Result<Self, CoreError> {
        if percent < Decimal::ZERO || percent > HUNDRED {
            return Err(CoreError::Validation(format!(
                "Financing rate percentage must be within 0..=100, got {percent}"
            )));
        }
        Ok(Self(percent / HUNDRED))
    }

    /// The rate as a 0..=1 fraction.
    pub fn as_fraction(self) -> Decimal {
        self.0
    }
}

/// Divide, returning zero for a zero denominator.
///
/// Financial ratios (margin, VAB over staff cost) are defined as 0 when the
/// denominator is 0; they must never surface NaN/Infinity or a panic.
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Render a 0..=1 fraction as a percentage value with trailing zeros trimmed
/// (`0.5` -> `50`, `1.1` -> `110`). Used for human-readable messages.
pub fn to_percent(fraction: Decimal) -> Decimal {
    (fraction * HUNDRED).normalize()
}
