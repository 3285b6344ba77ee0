//! Domain Layer - command model
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod command;
pub mod errors;
