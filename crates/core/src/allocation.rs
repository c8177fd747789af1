//! Allocation-ceiling validation.
//!
//! A person's combined occupancy across every work assignment in a given
//! month must never exceed 100%. This module holds the pure half of that
//! rule: the engine fetches the already-committed occupancy for the
//! (user, month, year) bucket and this module decides.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::money::to_percent;
use crate::types::DbId;

/// Maximum combined occupancy per (user, month, year): 100%.
pub const OCCUPANCY_CEILING: Decimal = Decimal::ONE;

/// Earliest year accepted for an allocation.
pub const MIN_ALLOCATION_YEAR: i32 = 2000;

/// Outcome of an allocation validation.
///
/// Never raised as an error: a rejection is a recoverable condition the
/// caller surfaces to the end user, so it travels as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub message: Option<String>,
}

impl ValidationOutcome {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
        }
    }
}

/// What an allocation row is committed to.
///
/// Leave (vacation, absence, other non-project time) is a real bucket under
/// the same uniqueness and ceiling rules, persisted as a NULL workpackage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentTarget {
    Workpackage(DbId),
    Leave,
}

impl AssignmentTarget {
    /// Build from the nullable `workpackage_id` column.
    pub fn from_db(workpackage_id: Option<DbId>) -> Self {
        match workpackage_id {
            Some(id) => Self::Workpackage(id),
            None => Self::Leave,
        }
    }

    /// The nullable `workpackage_id` column value.
    pub fn as_db(self) -> Option<DbId> {
        match self {
            Self::Workpackage(id) => Some(id),
            Self::Leave => None,
        }
    }
}

/// A proposed allocation row, before any write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedAllocation {
    pub target: AssignmentTarget,
    pub user_id: DbId,
    pub month: i16,
    pub year: i32,
    pub occupancy: Decimal,
}

/// Per-user monthly bucket: (user_id, year, month).
pub type BucketKey = (DbId, i32, i16);

impl ProposedAllocation {
    /// The (user, year, month) bucket this row counts against.
    pub fn bucket(&self) -> BucketKey {
        (self.user_id, self.year, self.month)
    }
}

/// Validate the plain input bounds: month 1-12, year >= 2000, occupancy 0..=1.
pub fn check_bounds(month: i16, year: i32, occupancy: Decimal) -> ValidationOutcome {
    if !(1..=12).contains(&month) {
        return ValidationOutcome::rejected(format!("Month must be within 1..=12, got {month}"));
    }
    if year < MIN_ALLOCATION_YEAR {
        return ValidationOutcome::rejected(format!(
            "Year must be {MIN_ALLOCATION_YEAR} or later, got {year}"
        ));
    }
    if occupancy < Decimal::ZERO || occupancy > OCCUPANCY_CEILING {
        return ValidationOutcome::rejected(format!(
            "Occupancy must be within 0..=1, got {occupancy}"
        ));
    }
    ValidationOutcome::ok()
}

/// Check the 100% ceiling for one bucket.
///
/// `committed` is the occupancy already persisted for the (user, month, year)
/// bucket, excluding the row being edited when this is an in-place update.
pub fn check_ceiling(
    committed: Decimal,
    proposed: Decimal,
    month: i16,
    year: i32,
) -> ValidationOutcome {
    let total = committed + proposed;
    if total > OCCUPANCY_CEILING {
        return ValidationOutcome::rejected(format!(
            "Allocation would total {}% in {year}-{month:02} ({}% already committed)",
            to_percent(total),
            to_percent(committed),
        ));
    }
    ValidationOutcome::ok()
}

/// Whether (year, month) falls inside a workpackage's date window.
///
/// The check is month-granular and each bound is applied independently when
/// present; an undefined bound does not constrain.
pub fn within_window(
    month: i16,
    year: i32,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> bool {
    let key = (year, u32::from(month as u16));
    if let Some(start) = start {
        if key < (start.year(), start.month()) {
            return false;
        }
    }
    if let Some(end) = end {
        if key > (end.year(), end.month()) {
            return false;
        }
    }
    true
}

/// Validate a batch of proposed allocations against the ceiling, atomically.
///
/// `committed` maps each (user, year, month) bucket to the occupancy already
/// persisted for it, *excluding* any row whose (target, user, month, year)
/// key appears in the batch (those rows are being replaced). The batch is
/// rejected as a whole on the first violation: bad bounds, a duplicate
/// (target, user, month, year) key within the batch, or any bucket whose
/// persisted-plus-batch sum exceeds the ceiling.
pub fn validate_batch(
    committed: &BTreeMap<BucketKey, Decimal>,
    batch: &[ProposedAllocation],
) -> ValidationOutcome {
    let mut batch_sums: BTreeMap<BucketKey, Decimal> = BTreeMap::new();
    let mut seen: Vec<(AssignmentTarget, BucketKey)> = Vec::with_capacity(batch.len());

    for proposal in batch {
        let bounds = check_bounds(proposal.month, proposal.year, proposal.occupancy);
        if !bounds.is_valid {
            return bounds;
        }

        let row_key = (proposal.target, proposal.bucket());
        if seen.contains(&row_key) {
            return ValidationOutcome::rejected(format!(
                "Duplicate allocation for user {} in {}-{:02} on the same assignment",
                proposal.user_id, proposal.year, proposal.month,
            ));
        }
        seen.push(row_key);

        *batch_sums.entry(proposal.bucket()).or_insert(Decimal::ZERO) += proposal.occupancy;
    }

    for (bucket, batch_sum) in &batch_sums {
        let persisted = committed.get(bucket).copied().unwrap_or(Decimal::ZERO);
        let outcome = check_ceiling(persisted, *batch_sum, bucket.2, bucket.1);
        if !outcome.is_valid {
            return outcome;
        }
    }

    ValidationOutcome::ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn proposal(
        target: AssignmentTarget,
        user_id: DbId,
        month: i16,
        year: i32,
        occupancy: Decimal,
    ) -> ProposedAllocation {
        ProposedAllocation {
            target,
            user_id,
            month,
            year,
            occupancy,
        }
    }

    // -- check_bounds --

    #[test]
    fn bounds_accept_valid_input() {
        assert!(check_bounds(6, 2025, dec!(0.5)).is_valid);
        assert!(check_bounds(1, 2000, Decimal::ZERO).is_valid);
        assert!(check_bounds(12, 2030, Decimal::ONE).is_valid);
    }

    #[test]
    fn bounds_reject_bad_month() {
        assert!(!check_bounds(0, 2025, dec!(0.5)).is_valid);
        assert!(!check_bounds(13, 2025, dec!(0.5)).is_valid);
    }

    #[test]
    fn bounds_reject_early_year() {
        assert!(!check_bounds(6, 1999, dec!(0.5)).is_valid);
    }

    #[test]
    fn bounds_reject_occupancy_out_of_range() {
        assert!(!check_bounds(6, 2025, dec!(-0.1)).is_valid);
        assert!(!check_bounds(6, 2025, dec!(1.01)).is_valid);
    }

    // -- check_ceiling --

    #[test]
    fn ceiling_rejects_over_commitment_with_percentages() {
        // Existing 60%, proposing 50% -> 110% total.
        let outcome = check_ceiling(dec!(0.6), dec!(0.5), 6, 2025);
        assert!(!outcome.is_valid);
        let message = outcome.message.unwrap();
        assert!(message.contains("110%"), "message was: {message}");
        assert!(message.contains("60%"), "message was: {message}");
        assert!(message.contains("2025-06"), "message was: {message}");
    }

    #[test]
    fn ceiling_allows_exactly_one_hundred_percent() {
        assert!(check_ceiling(dec!(0.6), dec!(0.4), 6, 2025).is_valid);
    }

    #[test]
    fn ceiling_allows_under_commitment() {
        assert!(check_ceiling(dec!(0.25), dec!(0.25), 1, 2024).is_valid);
    }

    #[test]
    fn ceiling_is_idempotent() {
        let first = check_ceiling(dec!(0.6), dec!(0.5), 6, 2025);
        let second = check_ceiling(dec!(0.6), dec!(0.5), 6, 2025);
        assert_eq!(first, second);
    }

    // -- within_window --

    #[test]
    fn window_unbounded_accepts_everything() {
        assert!(within_window(6, 2025, None, None));
    }

    #[test]
    fn window_rejects_month_before_start() {
        let start = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert!(!within_window(2, 2025, Some(start), None));
        // Same month as the start date is inside the window.
        assert!(within_window(3, 2025, Some(start), None));
    }

    #[test]
    fn window_rejects_month_after_end() {
        let end = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        assert!(!within_window(10, 2025, None, Some(end)));
        assert!(within_window(9, 2025, None, Some(end)));
    }

    #[test]
    fn window_checks_both_bounds() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert!(within_window(6, 2025, Some(start), Some(end)));
        assert!(!within_window(6, 2023, Some(start), Some(end)));
        assert!(!within_window(1, 2026, Some(start), Some(end)));
    }

    // -- AssignmentTarget --

    #[test]
    fn assignment_target_round_trips_nullable_column() {
        assert_eq!(
            AssignmentTarget::from_db(Some(7)),
            AssignmentTarget::Workpackage(7)
        );
        assert_eq!(AssignmentTarget::from_db(None), AssignmentTarget::Leave);
        assert_eq!(AssignmentTarget::Workpackage(7).as_db(), Some(7));
        assert_eq!(AssignmentTarget::Leave.as_db(), None);
    }

    // -- validate_batch --

    #[test]
    fn batch_over_ceiling_rejected_as_a_whole() {
        // Three 40% rows for the same user and month across three
        // workpackages: 120% total, the whole batch must be rejected.
        let batch = vec![
            proposal(AssignmentTarget::Workpackage(1), 9, 6, 2025, dec!(0.4)),
            proposal(AssignmentTarget::Workpackage(2), 9, 6, 2025, dec!(0.4)),
            proposal(AssignmentTarget::Workpackage(3), 9, 6, 2025, dec!(0.4)),
        ];
        let outcome = validate_batch(&BTreeMap::new(), &batch);
        assert!(!outcome.is_valid);
        assert!(outcome.message.unwrap().contains("120%"));
    }

    #[test]
    fn batch_counts_persisted_occupancy() {
        let mut committed = BTreeMap::new();
        committed.insert((9, 2025, 6), dec!(0.7));
        let batch = vec![proposal(
            AssignmentTarget::Workpackage(1),
            9,
            6,
            2025,
            dec!(0.4),
        )];
        assert!(!validate_batch(&committed, &batch).is_valid);
    }

    #[test]
    fn batch_exactly_at_ceiling_accepted() {
        let mut committed = BTreeMap::new();
        committed.insert((9, 2025, 6), dec!(0.2));
        let batch = vec![
            proposal(AssignmentTarget::Workpackage(1), 9, 6, 2025, dec!(0.5)),
            proposal(AssignmentTarget::Workpackage(2), 9, 6, 2025, dec!(0.3)),
        ];
        assert!(validate_batch(&committed, &batch).is_valid);
    }

    #[test]
    fn batch_duplicate_assignment_rejected() {
        let batch = vec![
            proposal(AssignmentTarget::Workpackage(1), 9, 6, 2025, dec!(0.2)),
            proposal(AssignmentTarget::Workpackage(1), 9, 6, 2025, dec!(0.2)),
        ];
        let outcome = validate_batch(&BTreeMap::new(), &batch);
        assert!(!outcome.is_valid);
        assert!(outcome.message.unwrap().contains("Duplicate"));
    }

    #[test]
    fn batch_leave_is_its_own_assignment_bucket() {
        // One leave row and one workpackage row for the same month are two
        // distinct assignments but share the same occupancy bucket.
        let batch = vec![
            proposal(AssignmentTarget::Leave, 9, 6, 2025, dec!(0.6)),
            proposal(AssignmentTarget::Workpackage(1), 9, 6, 2025, dec!(0.6)),
        ];
        let outcome = validate_batch(&BTreeMap::new(), &batch);
        assert!(!outcome.is_valid);
        assert!(outcome.message.unwrap().contains("120%"));
    }

    #[test]
    fn batch_independent_users_do_not_interfere() {
        let batch = vec![
            proposal(AssignmentTarget::Workpackage(1), 9, 6, 2025, dec!(0.9)),
            proposal(AssignmentTarget::Workpackage(1), 10, 6, 2025, dec!(0.9)),
        ];
        assert!(validate_batch(&BTreeMap::new(), &batch).is_valid);
    }

    #[test]
    fn batch_bad_bounds_rejected_before_ceiling() {
        let batch = vec![proposal(
            AssignmentTarget::Workpackage(1),
            9,
            13,
            2025,
            dec!(0.4),
        )];
        let outcome = validate_batch(&BTreeMap::new(), &batch);
        assert!(!outcome.is_valid);
        assert!(outcome.message.unwrap().contains("Month"));
    }

    #[test]
    fn empty_batch_is_valid() {
        assert!(validate_batch(&BTreeMap::new(), &[]).is_valid);
    }
}
