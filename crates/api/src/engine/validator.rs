//! Allocation validation and serialized allocation writes.
//!
//! Reads (dry-run validation) run against the pool. Writes re-validate
//! inside the transaction that performs the write, holding the bucket's
//! advisory lock, so two concurrent requests allocating the same person in
//! the same month cannot both pass and both commit. An advisory lock rather
//! than `FOR UPDATE` row locks because an empty bucket has no rows to lock.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use grantflow_core::allocation::{
    check_bounds, check_ceiling, validate_batch, AssignmentTarget, BucketKey, ProposedAllocation,
    ValidationOutcome, within_window,
};
use grantflow_core::error::CoreError;
use grantflow_core::types::DbId;
use grantflow_db::models::allocation::{Allocation, AllocationKey, UpsertAllocation};
use grantflow_db::repositories::{AllocationRepo, ProjectRepo, WorkpackageRepo};

use crate::error::{AppError, AppResult};

/// Request for a dry-run allocation validation.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateRequest {
    /// `None` targets the leave/absence bucket.
    pub workpackage_id: Option<DbId>,
    pub user_id: DbId,
    pub month: i16,
    pub year: i32,
    pub occupancy: Decimal,
    /// Exclude the row at this exact key from the committed sum
    /// (re-validating an in-place edit).
    #[serde(default)]
    pub exclude_current: bool,
}

/// Validate a proposed allocation without writing anything.
///
/// Checks, in order: input bounds, the workpackage date window, the owning
/// project's mutability, and finally the 100% ceiling against the rows
/// already persisted for the (user, month, year) bucket.
pub async fn validate(pool: &PgPool, request: &ValidateRequest) -> AppResult<ValidationOutcome> {
    let bounds = check_bounds(request.month, request.year, request.occupancy);
    if !bounds.is_valid {
        return Ok(bounds);
    }

    let context = check_context(pool, request.workpackage_id, request.month, request.year).await?;
    if !context.is_valid {
        return Ok(context);
    }

    let rows =
        AllocationRepo::find_for_user_month(pool, request.user_id, request.month, request.year)
            .await?;
    let exclude = request.exclude_current.then_some(AllocationKey {
        workpackage_id: request.workpackage_id,
        user_id: request.user_id,
        month: request.month,
        year: request.year,
    });
    let committed = committed_sum(&rows, exclude.as_ref());

    Ok(check_ceiling(
        committed,
        request.occupancy,
        request.month,
        request.year,
    ))
}

/// Upsert one allocation, re-validating inside the write transaction.
///
/// Returns the outcome and, when it is valid, the written row. A rejection
/// rolls the transaction back and leaves the stored rows untouched.
pub async fn upsert_validated(
    pool: &PgPool,
    input: &UpsertAllocation,
) -> AppResult<(ValidationOutcome, Option<Allocation>)> {
    let bounds = check_bounds(input.month, input.year, input.occupancy);
    if !bounds.is_valid {
        return Ok((bounds, None));
    }

    let context = check_context(pool, input.workpackage_id, input.month, input.year).await?;
    if !context.is_valid {
        return Ok((context, None));
    }

    let mut tx = pool.begin().await?;

    AllocationRepo::lock_bucket(&mut *tx, input.user_id, input.month, input.year).await?;
    let rows =
        AllocationRepo::find_for_user_month(&mut *tx, input.user_id, input.month, input.year)
            .await?;
    // An upsert replaces the row at its own key, so that row never counts
    // against the proposal.
    let committed = committed_sum(&rows, Some(&input.key()));
    let outcome = check_ceiling(committed, input.occupancy, input.month, input.year);
    if !outcome.is_valid {
        return Ok((outcome, None));
    }

    let written = AllocationRepo::upsert(&mut *tx, input).await?;
    tx.commit().await?;

    Ok((ValidationOutcome::ok(), Some(written)))
}

/// Upsert a batch of allocations atomically.
///
/// Every record is validated against the rows already persisted for its
/// bucket plus the other records in the batch; one violation rejects the
/// whole batch and nothing is written.
pub async fn write_batch(
    pool: &PgPool,
    inputs: &[UpsertAllocation],
) -> AppResult<(ValidationOutcome, Vec<Allocation>)> {
    for input in inputs {
        let context = check_context(pool, input.workpackage_id, input.month, input.year).await?;
        if !context.is_valid {
            return Ok((context, Vec::new()));
        }
    }

    let proposals: Vec<ProposedAllocation> = inputs
        .iter()
        .map(|input| ProposedAllocation {
            target: AssignmentTarget::from_db(input.workpackage_id),
            user_id: input.user_id,
            month: input.month,
            year: input.year,
            occupancy: input.occupancy,
        })
        .collect();

    let batch_keys: Vec<AllocationKey> = inputs.iter().map(UpsertAllocation::key).collect();

    let mut tx = pool.begin().await?;

    // Lock buckets in sorted order so concurrent batches cannot deadlock.
    let buckets: BTreeSet<BucketKey> = proposals.iter().map(ProposedAllocation::bucket).collect();
    let mut committed: BTreeMap<BucketKey, Decimal> = BTreeMap::new();
    for &(user_id, year, month) in &buckets {
        AllocationRepo::lock_bucket(&mut *tx, user_id, month, year).await?;
        let rows = AllocationRepo::find_for_user_month(&mut *tx, user_id, month, year).await?;
        let sum = rows
            .iter()
            .filter(|row| !batch_keys.iter().any(|key| row_matches_key(row, key)))
            .map(|row| row.occupancy)
            .sum();
        committed.insert((user_id, year, month), sum);
    }

    let outcome = validate_batch(&committed, &proposals);
    if !outcome.is_valid {
        return Ok((outcome, Vec::new()));
    }

    let mut written = Vec::with_capacity(inputs.len());
    for input in inputs {
        written.push(AllocationRepo::upsert(&mut *tx, input).await?);
    }
    tx.commit().await?;

    Ok((ValidationOutcome::ok(), written))
}

/// Context checks that do not depend on committed occupancy: the target
/// workpackage's date window and the owning project's mutability.
///
/// Leave allocations (no workpackage) have no window or project to check.
async fn check_context(
    pool: &PgPool,
    workpackage_id: Option<DbId>,
    month: i16,
    year: i32,
) -> AppResult<ValidationOutcome> {
    let Some(workpackage_id) = workpackage_id else {
        return Ok(ValidationOutcome::ok());
    };

    let workpackage = WorkpackageRepo::find_by_id(pool, workpackage_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Workpackage",
            id: workpackage_id,
        }))?;

    if !within_window(month, year, workpackage.start_date, workpackage.end_date) {
        return Ok(ValidationOutcome::rejected(format!(
            "{year}-{month:02} is outside the date range of workpackage '{}'",
            workpackage.name
        )));
    }

    let project = ProjectRepo::find_by_id(pool, workpackage.project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: workpackage.project_id,
        }))?;
    let state = project.state()?;
    if !state.allows_allocation_edits() {
        return Ok(ValidationOutcome::rejected(format!(
            "Project '{}' is {}; allocations are frozen",
            project.name,
            state.label()
        )));
    }

    Ok(ValidationOutcome::ok())
}

/// Sum the occupancy of the given rows, skipping the row at `exclude`.
fn committed_sum(rows: &[Allocation], exclude: Option<&AllocationKey>) -> Decimal {
    rows.iter()
        .filter(|row| !exclude.is_some_and(|key| row_matches_key(row, key)))
        .map(|row| row.occupancy)
        .sum()
}

fn row_matches_key(row: &Allocation, key: &AllocationKey) -> bool {
    row.workpackage_id == key.workpackage_id
        && row.user_id == key.user_id
        && row.month == key.month
        && row.year == key.year
}
