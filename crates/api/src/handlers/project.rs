//! Project CRUD and lifecycle handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use grantflow_core::error::CoreError;
use grantflow_core::project::ProjectState;
use grantflow_core::types::DbId;
use grantflow_db::models::project::{CreateProject, Project, UpdateProject};
use grantflow_db::repositories::ProjectRepo;

use crate::engine;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /projects -- create a project in the Draft state.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    if input.name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Project name must not be empty".to_string(),
        )));
    }
    let project = ProjectRepo::create(&state.pool, &input).await?;
    tracing::info!(project_id = project.id, "Created project");
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /projects -- list all projects.
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Project>>> {
    Ok(Json(ProjectRepo::list(&state.pool).await?))
}

/// GET /projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(Json(project))
}

/// PUT /projects/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<Project>> {
    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(Json(project))
}

/// DELETE /projects/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let removed = ProjectRepo::delete(&state.pool, id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /projects/{id}/approve -- approve and freeze the plan snapshot.
pub async fn approve(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let project = engine::snapshot::approve_project(&state.pool, id).await?;
    Ok(Json(project))
}

/// Body of POST /projects/{id}/state.
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    /// Target state wire name, e.g. `"in_development"`.
    pub state: String,
}

/// POST /projects/{id}/state -- lifecycle transitions other than approval.
pub async fn transition(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<TransitionRequest>,
) -> AppResult<Json<Project>> {
    let next = ProjectState::from_name(&body.state).ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Unknown project state '{}'",
            body.state
        )))
    })?;
    let project = engine::snapshot::transition_project(&state.pool, id, next).await?;
    Ok(Json(project))
}
