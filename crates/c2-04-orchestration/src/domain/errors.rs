//! # Service Errors
//!
//! Every collaborator error converts into [`ServiceError`] with `?`.
//!
//! | Source | Becomes |
//! |--------|---------|
//! | `IdentifierError` | `Validation` |
//! | `KeyError::InvalidKey` | `Validation` |
//! | `KeyError::CryptoFailure`, `CryptoError` | `Crypto` |
//! | `KeyError::NotPubKeyMode` | `NotPubKeyMode` |
//! | `KeyError::KeyStore` | `Rotation` |
//! | `DbError::NotFound` / `AlreadyExists` | `NotFound` / `AlreadyExists` |
//! | other `DbError` | `Storage` |

use c2_01_command_codec::CodecError;
use c2_02_key_protection::{KeyError, RotationError};
use c2_03_storage::DbError;
use shared_bus::TransportError;
use shared_crypto::CryptoError;
use shared_types::IdentifierError;
use thiserror::Error;

/// Errors returned by every `E4Service` operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    /// Caller input was rejected.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A referenced client, topic or edge does not exist.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// A client or topic with this identity already exists.
    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: &'static str, key: String },

    /// A command could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Protection or KEK decryption failed.
    #[error("Crypto failure: {0}")]
    Crypto(CryptoError),

    /// The C2 key rotation could not be staged, committed or rolled back.
    #[error("C2 key rotation failed: {0}")]
    Rotation(#[from] RotationError),

    /// The transport refused a publish or subscription.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The database failed.
    #[error("Storage failure: {0}")]
    Storage(DbError),

    /// The operation exists only in Public-Key mode.
    #[error("Operation requires Public-Key mode")]
    NotPubKeyMode,
}

impl ServiceError {
    pub(crate) fn edge_not_found(client: impl ToString, topic: &str) -> Self {
        ServiceError::NotFound {
            entity: "edge",
            key: format!("{}/{}", client.to_string(), topic),
        }
    }
}

impl From<DbError> for ServiceError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { entity, key } => ServiceError::NotFound { entity, key },
            DbError::AlreadyExists { entity, key } => ServiceError::AlreadyExists { entity, key },
            other => ServiceError::Storage(other),
        }
    }
}

impl From<KeyError> for ServiceError {
    fn from(e: KeyError) -> Self {
        match e {
            KeyError::InvalidKey(reason) => ServiceError::Validation(reason),
            KeyError::CryptoFailure(inner) => ServiceError::Crypto(inner),
            KeyError::NotPubKeyMode => ServiceError::NotPubKeyMode,
            KeyError::KeyStore(inner) => ServiceError::Rotation(RotationError::KeyStore(inner)),
        }
    }
}

impl From<CryptoError> for ServiceError {
    fn from(e: CryptoError) -> Self {
        ServiceError::Crypto(e)
    }
}

impl From<IdentifierError> for ServiceError {
    fn from(e: IdentifierError) -> Self {
        ServiceError::Validation(e.to_string())
    }
}
