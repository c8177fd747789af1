//! GrantFlow domain core.
//!
//! Pure computation logic for the budget & allocation engine: decimal money
//! helpers, the 100%-occupancy allocation validator, real-cost accumulation,
//! submitted-budget mode selection, approval-snapshot parsing, and the
//! financial-totals formulas. No I/O lives here; the `grantflow-api` engine
//! feeds this crate rows fetched through `grantflow-db`.

pub mod allocation;
pub mod budget;
pub mod costing;
pub mod error;
pub mod money;
pub mod project;
pub mod snapshot;
pub mod totals;
pub mod types;
