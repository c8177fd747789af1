//! Approval snapshot: the frozen copy of a project's plan.
//!
//! When a project transitions to Approved, the live workpackage / resource /
//! material tree is serialized onto the project row. From then on the
//! submitted-budget calculation reads this snapshot instead of live data, so
//! later staffing edits cannot retroactively change the entitlement a funder
//! approved.
//!
//! The blob is versioned and strictly typed. Parsing fails closed: any
//! malformed or unrecognized payload becomes a [`SnapshotError`], which the
//! budget engine absorbs by falling back to the real-cost regime.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::DbId;

/// The only snapshot schema version written today.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot payload does not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("unsupported snapshot version {0}")]
    Version(u32),
}

/// A frozen project plan, captured at the moment of approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalSnapshot {
    pub version: u32,
    /// Flat rate per full-time-equivalent unit at approval time.
    /// Zero means the project budgets by itemized cost instead.
    pub eti_rate: Decimal,
    pub workpackages: Vec<SnapshotWorkpackage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotWorkpackage {
    pub id: DbId,
    pub name: String,
    pub resources: Vec<SnapshotResource>,
    pub materials: Vec<SnapshotMaterial>,
}

/// One allocation row as it stood at approval, with the salary frozen in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotResource {
    pub user_id: DbId,
    pub month: i16,
    pub year: i32,
    pub occupancy: Decimal,
    pub monthly_salary: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMaterial {
    pub unit_price: Decimal,
    pub quantity: i32,
    pub category: String,
    pub usage_year: i32,
}

impl ApprovalSnapshot {
    /// Decode a stored snapshot blob, failing closed on anything unexpected.
    pub fn parse(value: &serde_json::Value) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_value(value.clone())?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version(snapshot.version));
        }
        Ok(snapshot)
    }

    /// Iterate every resource row across all workpackages.
    pub fn resources(&self) -> impl Iterator<Item = &SnapshotResource> {
        self.workpackages.iter().flat_map(|wp| wp.resources.iter())
    }

    /// Total occupancy across the snapshot, optionally filtered by year.
    pub fn total_occupancy(&self, year: Option<i32>) -> Decimal {
        self.resources()
            .filter(|r| year.is_none_or(|y| r.year == y))
            .map(|r| r.occupancy)
            .sum()
    }

    /// Occupancy grouped by year, ascending.
    pub fn occupancy_by_year(&self) -> BTreeMap<i32, Decimal> {
        let mut by_year: BTreeMap<i32, Decimal> = BTreeMap::new();
        for resource in self.resources() {
            *by_year.entry(resource.year).or_insert(Decimal::ZERO) += resource.occupancy;
        }
        by_year
    }
}
