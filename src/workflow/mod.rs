//! Declarative workflow tables and event-ordering validation
//!
//! This module keeps lab process rules out of the engine:
//! - Workflows are data: states and transitions loaded from JSON, validated
//!   once, immutable afterwards
//! - The validator judges a proposed event against what each vessel has
//!   actually recorded, not against a tracked current state
//! - Business-rule violations are reported as strings, never thrown

pub mod config;
pub mod validator;

pub use config::*;
pub use validator::*;
