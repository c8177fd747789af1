//! Project-structure handlers: workpackages, tasks, and material line items.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use grantflow_core::error::CoreError;
use grantflow_core::types::DbId;
use grantflow_db::models::material::{CreateMaterial, Material, UpdateMaterial};
use grantflow_db::models::task::{CreateTask, Task, UpdateTask};
use grantflow_db::models::workpackage::{CreateWorkpackage, UpdateWorkpackage, Workpackage};
use grantflow_db::repositories::{MaterialRepo, TaskRepo, WorkpackageRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}

// -- workpackages --

/// POST /workpackages
pub async fn create_workpackage(
    State(state): State<AppState>,
    Json(input): Json<CreateWorkpackage>,
) -> AppResult<(StatusCode, Json<Workpackage>)> {
    let row = WorkpackageRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /projects/{id}/workpackages
pub async fn list_workpackages(
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<Vec<Workpackage>>> {
    let rows = WorkpackageRepo::list_for_project(&state.pool, project_id).await?;
    Ok(Json(rows))
}

/// PUT /workpackages/{id}
pub async fn update_workpackage(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWorkpackage>,
) -> AppResult<Json<Workpackage>> {
    let row = WorkpackageRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found("Workpackage", id))?;
    Ok(Json(row))
}

/// DELETE /workpackages/{id}
pub async fn delete_workpackage(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !WorkpackageRepo::delete(&state.pool, id).await? {
        return Err(not_found("Workpackage", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// -- tasks --

/// POST /tasks
pub async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<Task>)> {
    let row = TaskRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /workpackages/{id}/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Path(workpackage_id): Path<DbId>,
) -> AppResult<Json<Vec<Task>>> {
    let rows = TaskRepo::list_for_workpackage(&state.pool, workpackage_id).await?;
    Ok(Json(rows))
}

/// PUT /tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> AppResult<Json<Task>> {
    let row = TaskRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found("Task", id))?;
    Ok(Json(row))
}

/// DELETE /tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TaskRepo::delete(&state.pool, id).await? {
        return Err(not_found("Task", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// -- materials --

/// POST /materials
pub async fn create_material(
    State(state): State<AppState>,
    Json(input): Json<CreateMaterial>,
) -> AppResult<(StatusCode, Json<Material>)> {
    if !(1..=12).contains(&input.usage_month) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Usage month must be within 1..=12, got {}",
            input.usage_month
        ))));
    }
    let row = MaterialRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /workpackages/{id}/materials
pub async fn list_materials(
    State(state): State<AppState>,
    Path(workpackage_id): Path<DbId>,
) -> AppResult<Json<Vec<Material>>> {
    let rows = MaterialRepo::list_for_workpackage(&state.pool, workpackage_id).await?;
    Ok(Json(rows))
}

/// PUT /materials/{id}
pub async fn update_material(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMaterial>,
) -> AppResult<Json<Material>> {
    let row = MaterialRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(not_found("Material", id))?;
    Ok(Json(row))
}

/// DELETE /materials/{id}
pub async fn delete_material(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !MaterialRepo::delete(&state.pool, id).await? {
        return Err(not_found("Material", id));
    }
    Ok(StatusCode::NO_CONTENT)
}
