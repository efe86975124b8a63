//! Student enrollment wizard
//!
//! A four-step enrollment flow (student details, academic details, address
//! and guardian, review and submit) with a persistent state store, step
//! gating, per-step validation and PIN-code address auto-fill.

pub mod cli;
pub mod core;
pub mod entities;
pub mod schema;
