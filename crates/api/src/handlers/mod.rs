//! HTTP handlers: thin translation between axum extractors and the engine.

pub mod allocation;
pub mod finance;
pub mod project;
pub mod structure;
pub mod user;
