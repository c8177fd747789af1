//! Allocation handlers.
//!
//! Ceiling rejections travel as `ValidationOutcome` data in 200 responses:
//! an over-commitment is a correctable user condition, not a server error.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use grantflow_core::allocation::ValidationOutcome;
use grantflow_core::error::CoreError;
use grantflow_core::types::DbId;
use grantflow_db::models::allocation::{Allocation, AllocationKey, UpsertAllocation};
use grantflow_db::repositories::AllocationRepo;

use crate::engine::validator;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Response for a single validated allocation write.
#[derive(Debug, Serialize)]
pub struct AllocationWriteResponse {
    pub outcome: ValidationOutcome,
    /// Present only when the outcome is valid.
    pub allocation: Option<Allocation>,
}

/// Response for an atomic batch write.
#[derive(Debug, Serialize)]
pub struct BatchWriteResponse {
    pub outcome: ValidationOutcome,
    /// Written rows; empty when the batch was rejected.
    pub allocations: Vec<Allocation>,
}

/// Body of POST /allocations/batch.
#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub allocations: Vec<UpsertAllocation>,
}

/// POST /allocations/validate -- dry-run validation, writes nothing.
pub async fn validate(
    State(state): State<AppState>,
    Json(request): Json<validator::ValidateRequest>,
) -> AppResult<Json<ValidationOutcome>> {
    let outcome = validator::validate(&state.pool, &request).await?;
    Ok(Json(outcome))
}

/// PUT /allocations -- upsert one allocation with ceiling validation.
pub async fn upsert(
    State(state): State<AppState>,
    Json(input): Json<UpsertAllocation>,
) -> AppResult<Json<AllocationWriteResponse>> {
    let (outcome, allocation) = validator::upsert_validated(&state.pool, &input).await?;
    Ok(Json(AllocationWriteResponse {
        outcome,
        allocation,
    }))
}

/// POST /allocations/batch -- all-or-nothing batch upsert.
pub async fn batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> AppResult<Json<BatchWriteResponse>> {
    let (outcome, allocations) = validator::write_batch(&state.pool, &request.allocations).await?;
    Ok(Json(BatchWriteResponse {
        outcome,
        allocations,
    }))
}

/// DELETE /allocations -- remove the row at the natural key.
pub async fn delete(
    State(state): State<AppState>,
    Json(key): Json<AllocationKey>,
) -> AppResult<StatusCode> {
    let removed = AllocationRepo::delete(&state.pool, &key).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Allocation",
            id: key.user_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Query for GET /users/{id}/allocations.
#[derive(Debug, Deserialize)]
pub struct UserMonthQuery {
    pub month: i16,
    pub year: i32,
}

/// GET /users/{id}/allocations?month=&year= -- one user's rows for a month,
/// leave bucket included.
pub async fn list_for_user_month(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
    Query(query): Query<UserMonthQuery>,
) -> AppResult<Json<Vec<Allocation>>> {
    let rows =
        AllocationRepo::find_for_user_month(&state.pool, user_id, query.month, query.year).await?;
    Ok(Json(rows))
}
