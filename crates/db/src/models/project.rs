//! Project entity model and DTOs.

use chrono::NaiveDate;
use grantflow_core::error::CoreError;
use grantflow_core::project::{ProjectState, StateId};
use grantflow_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub state_id: StateId,
    /// Flat rate per FTE unit; zero means "budget by itemized cost".
    pub eti_rate: Decimal,
    /// Financing rate as a 0..=1 fraction.
    pub financing_rate: Decimal,
    /// Informational overhead percentage; the totals formulas use a fixed
    /// constant instead.
    pub overhead_pct: Decimal,
    /// Frozen approval snapshot, present once the project is approved.
    pub approved_snapshot: Option<serde_json::Value>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Resolve the state column to the lifecycle enum.
    ///
    /// An unknown state id means the row predates the enum or was corrupted;
    /// surfaced as an internal error rather than a panic.
    pub fn state(&self) -> Result<ProjectState, CoreError> {
        ProjectState::from_id(self.state_id).ok_or_else(|| {
            CoreError::Internal(format!(
                "Project {} has unknown state id {}",
                self.id, self.state_id
            ))
        })
    }
}

/// DTO for creating a new project. Starts in Draft.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to 0 (itemized-cost regime) if omitted.
    pub eti_rate: Option<Decimal>,
    /// 0..=1 fraction; defaults to 0.
    pub financing_rate: Option<Decimal>,
    pub overhead_pct: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub eti_rate: Option<Decimal>,
    pub financing_rate: Option<Decimal>,
    pub overhead_pct: Option<Decimal>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
