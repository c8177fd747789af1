//! User entity model and DTOs.

use grantflow_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    /// Monthly base salary; `None` means the person contributes no cost.
    pub monthly_salary: Option<Decimal>,
    /// Employment regime: `full_time` or `part_time`.
    pub regime: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub monthly_salary: Option<Decimal>,
    /// Defaults to `full_time` if omitted.
    pub regime: Option<String>,
}

/// DTO for updating an existing user. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub monthly_salary: Option<Decimal>,
    pub regime: Option<String>,
}
