//! Error types for the command codec.

use crate::domain::command::CommandKind;
use thiserror::Error;

/// Errors raised while building, encoding or decoding a command.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// A field is missing, unexpected, or has the wrong length.
    #[error("Invalid argument `{field}`: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    /// The tag byte does not name a known command.
    #[error("Unknown command tag: {0:#04x}")]
    UnknownVariant(u8),

    /// The payload length does not match the command's shape.
    #[error("Malformed {kind} payload: expected {expected} bytes, got {actual}")]
    TruncatedPayload {
        kind: CommandKind,
        expected: usize,
        actual: usize,
    },

    /// Nothing to decode.
    #[error("Empty command buffer")]
    Empty,
}

impl CodecError {
    pub(crate) fn missing(field: &'static str) -> Self {
        Self::InvalidArgument {
            field,
            reason: "required but absent".to_string(),
        }
    }

    pub(crate) fn unexpected(field: &'static str, kind: CommandKind) -> Self {
        Self::InvalidArgument {
            field,
            reason: format!("not allowed for {}", kind),
        }
    }

    pub(crate) fn wrong_length(field: &'static str, expected: &str, actual: usize) -> Self {
        Self::InvalidArgument {
            field,
            reason: format!("expected {} bytes, got {}", expected, actual),
        }
    }
}
