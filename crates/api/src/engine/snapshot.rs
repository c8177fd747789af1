//! Snapshot capture and project lifecycle transitions.
//!
//! Approval runs in a single REPEATABLE READ transaction: the project row is
//! locked `FOR UPDATE`, the live workpackage / resource / material tree is
//! read from one MVCC snapshot and frozen into a versioned JSON blob, and
//! the state flip plus the blob land in one UPDATE. A concurrent approve
//! blocks on the row lock and then fails the transition check. Every other
//! transition locks the row and flips the state in the same transaction.

use sqlx::{PgConnection, PgPool};

use grantflow_core::error::CoreError;
use grantflow_core::project::ProjectState;
use grantflow_core::snapshot::{
    ApprovalSnapshot, SnapshotMaterial, SnapshotResource, SnapshotWorkpackage, SNAPSHOT_VERSION,
};
use grantflow_core::types::DbId;
use grantflow_db::models::project::Project;
use grantflow_db::repositories::{AllocationRepo, MaterialRepo, ProjectRepo, WorkpackageRepo};

use crate::error::{AppError, AppResult};

/// Freeze the project's current plan into an approval snapshot.
///
/// Captures every workpackage with its allocation rows (salary included, so
/// later salary changes cannot alter the frozen entitlement) and material
/// line items. Reads through the caller's transaction so the captured tree
/// reflects a single point in time.
pub async fn capture_snapshot(
    conn: &mut PgConnection,
    project: &Project,
) -> AppResult<ApprovalSnapshot> {
    let mut workpackages = Vec::new();
    for workpackage in WorkpackageRepo::list_for_project(&mut *conn, project.id).await? {
        let resources = AllocationRepo::find_for_project_with_salary(
            &mut *conn,
            project.id,
            None,
            Some(workpackage.id),
        )
        .await?
        .into_iter()
        .map(|row| SnapshotResource {
            user_id: row.user_id,
            month: row.month,
            year: row.year,
            occupancy: row.occupancy,
            monthly_salary: row.monthly_salary,
        })
        .collect();

        let materials = MaterialRepo::list_for_workpackage(&mut *conn, workpackage.id)
            .await?
            .into_iter()
            .map(|row| SnapshotMaterial {
                unit_price: row.unit_price,
                quantity: row.quantity,
                category: row.category,
                usage_year: row.usage_year,
            })
            .collect();

        workpackages.push(SnapshotWorkpackage {
            id: workpackage.id,
            name: workpackage.name,
            resources,
            materials,
        });
    }

    Ok(ApprovalSnapshot {
        version: SNAPSHOT_VERSION,
        eti_rate: project.eti_rate,
        workpackages,
    })
}

/// Approve a project: validate the Pending → Approved edge, capture the
/// snapshot, and persist state plus blob atomically.
pub async fn approve_project(pool: &PgPool, project_id: DbId) -> AppResult<Project> {
    let mut tx = pool.begin().await?;
    // One MVCC snapshot for the whole capture; allocation edits committed
    // mid-capture cannot bleed into the frozen blob.
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
        .execute(&mut *tx)
        .await?;

    let project = ProjectRepo::lock_by_id(&mut *tx, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;
    let state = project.state()?;
    if !state.can_transition_to(ProjectState::Approved) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Cannot approve a project in state {}",
            state.label()
        ))));
    }

    let snapshot = capture_snapshot(&mut *tx, &project).await?;
    let blob = serde_json::to_value(&snapshot).map_err(|e| {
        AppError::Core(CoreError::Internal(format!(
            "Failed to serialize approval snapshot: {e}"
        )))
    })?;

    tracing::info!(
        project_id,
        workpackages = snapshot.workpackages.len(),
        "Approving project and freezing its plan"
    );

    let approved =
        ProjectRepo::set_state(&mut *tx, project_id, ProjectState::Approved.id(), Some(&blob))
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Project",
                id: project_id,
            }))?;
    tx.commit().await?;

    Ok(approved)
}

/// Apply a lifecycle transition other than approval.
///
/// Approval must go through [`approve_project`] so the snapshot is captured;
/// this function rejects it.
pub async fn transition_project(
    pool: &PgPool,
    project_id: DbId,
    next: ProjectState,
) -> AppResult<Project> {
    if next == ProjectState::Approved {
        return Err(AppError::Core(CoreError::Conflict(
            "Approval must go through the approve operation".to_string(),
        )));
    }

    let mut tx = pool.begin().await?;
    let project = ProjectRepo::lock_by_id(&mut *tx, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;
    let state = project.state()?;
    if !state.can_transition_to(next) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Illegal transition from {} to {}",
            state.label(),
            next.label()
        ))));
    }

    let updated = ProjectRepo::set_state(&mut *tx, project_id, next.id(), None)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))?;
    tx.commit().await?;

    Ok(updated)
}
