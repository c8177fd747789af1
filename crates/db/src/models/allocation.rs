//! Allocation entity model and DTOs.
//!
//! The central fact table: one row per (workpackage, user, month, year),
//! where a NULL workpackage represents non-project time (leave/absence).

use grantflow_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An allocation row from the `allocations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Allocation {
    pub id: DbId,
    /// `None` = leave/absence bucket.
    pub workpackage_id: Option<DbId>,
    pub user_id: DbId,
    pub month: i16,
    pub year: i32,
    /// Fraction of the person's time, 0..=1.
    pub occupancy: Decimal,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Natural key of an allocation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AllocationKey {
    pub workpackage_id: Option<DbId>,
    pub user_id: DbId,
    pub month: i16,
    pub year: i32,
}

/// DTO for creating or upserting an allocation.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertAllocation {
    pub workpackage_id: Option<DbId>,
    pub user_id: DbId,
    pub month: i16,
    pub year: i32,
    pub occupancy: Decimal,
}

impl UpsertAllocation {
    pub fn key(&self) -> AllocationKey {
        AllocationKey {
            workpackage_id: self.workpackage_id,
            user_id: self.user_id,
            month: self.month,
            year: self.year,
        }
    }
}

/// An allocation joined with its user's salary, as fetched for costing.
#[derive(Debug, Clone, FromRow)]
pub struct StaffAllocationRow {
    pub user_id: DbId,
    pub month: i16,
    pub year: i32,
    pub occupancy: Decimal,
    pub monthly_salary: Option<Decimal>,
}
