//! Material entity model and DTOs.

use grantflow_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A material row from the `materials` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Material {
    pub id: DbId,
    pub workpackage_id: DbId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    /// Expense category tag ("rubrica").
    pub category: String,
    pub usage_year: i32,
    pub usage_month: i16,
    /// Distinguishes realized from estimated spend in progress reporting.
    pub acquired: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new material.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMaterial {
    pub workpackage_id: DbId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub category: String,
    pub usage_year: i32,
    pub usage_month: i16,
}

/// DTO for updating an existing material. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMaterial {
    pub name: Option<String>,
    pub unit_price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub category: Option<String>,
    pub usage_year: Option<i32>,
    pub usage_month: Option<i16>,
    pub acquired: Option<bool>,
}
