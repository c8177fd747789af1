//! The budget & allocation computation engine.
//!
//! Orchestrates repository reads with the pure logic in `grantflow-core`:
//! allocation-ceiling validation on every write path, submitted-budget
//! regime selection (live vs snapshot vs real cost), real-cost accumulation,
//! snapshot capture at approval, and the financial-totals report.
//!
//! The engine is request-scoped and stateless: every call reads the
//! database fresh and holds nothing across requests.

pub mod budget;
pub mod real_cost;
pub mod snapshot;
pub mod totals;
pub mod validator;
