//! Error types for key protection and C2 key rotation.

use shared_crypto::CryptoError;
use thiserror::Error;

/// Errors from a [`C2KeyStore`](crate::ports::outbound::C2KeyStore).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyStoreError {
    /// Underlying I/O failed.
    #[error("Key store I/O failed: {0}")]
    Io(String),

    /// Stored material has the wrong shape.
    #[error("Stored key is corrupt: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for KeyStoreError {
    fn from(e: std::io::Error) -> Self {
        KeyStoreError::Io(e.to_string())
    }
}

/// Errors from `E4Key` operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    /// Key failed validation for the active mode.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Key agreement, encryption or decryption failed.
    #[error("Crypto failure: {0}")]
    CryptoFailure(CryptoError),

    /// Operation only exists in Public-Key mode.
    #[error("Operation requires Public-Key mode")]
    NotPubKeyMode,

    /// Persisting or loading the C2 key pair failed.
    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),
}

impl From<CryptoError> for KeyError {
    fn from(e: CryptoError) -> Self {
        match e {
            CryptoError::InvalidKeyLength { .. }
            | CryptoError::InvalidPublicKey(_)
            | CryptoError::InvalidPrivateKey(_)
            | CryptoError::PasswordTooShort { .. } => KeyError::InvalidKey(e.to_string()),
            other => KeyError::CryptoFailure(other),
        }
    }
}

/// Errors from a [`C2KeyRotationTx`](crate::domain::rotation::C2KeyRotationTx).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RotationError {
    /// Commit or rollback was already performed.
    #[error("Rotation transaction already finalized")]
    AlreadyFinalized,

    /// The key store refused the write; the transaction is still open.
    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),
}
