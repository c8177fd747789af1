//! Workpackage entity model and DTOs.

use chrono::NaiveDate;
use grantflow_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A workpackage row from the `workpackages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Workpackage {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub completed: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new workpackage.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkpackage {
    pub project_id: DbId,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// DTO for updating an existing workpackage. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateWorkpackage {
    pub name: Option<String>,
    pub completed: Option<bool>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
