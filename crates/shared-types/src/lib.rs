//! # Shared Types Crate
//!
//! Identifiers and protocol constants used across the C2 workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every length a device depends on is defined here.
//! - **Deterministic Identity**: client IDs and topic hashes are derived from
//!   names, so routing addresses are reproducible without a lookup.

pub mod constants;
pub mod entities;
pub mod errors;

pub use constants::*;
pub use entities::*;
pub use errors::*;
