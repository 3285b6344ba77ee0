//! # Error Types
//!
//! Errors raised while parsing or validating shared identifiers.

use thiserror::Error;

/// Errors that can occur when building identifiers from raw input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentifierError {
    /// Raw bytes have the wrong length.
    #[error("Invalid {kind} length: expected {expected}, got {actual}")]
    InvalidLength {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Hex text could not be decoded.
    #[error("Invalid hex encoding for {kind}: {reason}")]
    InvalidHex { kind: &'static str, reason: String },

    /// Name is empty or longer than `MAX_NAME_LEN`.
    #[error("Invalid {kind} name: {reason}")]
    InvalidName { kind: &'static str, reason: String },
}
