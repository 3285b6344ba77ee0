//! # Domain Errors
//!
//! - `DbError` is what callers of the [`Database`](crate::ports::inbound::Database) port see.
//! - `KVStoreError` is what a key-value backend reports; it surfaces as `DbError::Backend`.

use thiserror::Error;

/// Errors from the storage API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DbError {
    /// Requested record does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// A record with this identity already exists.
    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: &'static str, key: String },

    /// The backing store failed.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// A stored record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl DbError {
    pub(crate) fn client_not_found(key: impl ToString) -> Self {
        DbError::NotFound {
            entity: "client",
            key: key.to_string(),
        }
    }

    pub(crate) fn topic_not_found(key: impl ToString) -> Self {
        DbError::NotFound {
            entity: "topic",
            key: key.to_string(),
        }
    }

    /// Whether this is a `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// Key-value store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },
}

impl From<KVStoreError> for DbError {
    fn from(err: KVStoreError) -> Self {
        DbError::Backend(err.to_string())
    }
}

impl From<bincode::Error> for DbError {
    fn from(err: bincode::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}
