//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed (wrong key, tampered ciphertext or associated data)
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Protected payload is shorter than the fixed overhead
    #[error("Payload too short: need at least {min} bytes, got {actual}")]
    PayloadTooShort {
        /// Minimum length in bytes
        min: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// Protected payload timestamp is outside the freshness window
    #[error("Timestamp {timestamp} is too old (now {now})")]
    TimestampTooOld {
        /// Timestamp carried by the payload
        timestamp: u64,
        /// Time of the check
        now: u64,
    },

    /// Protected payload timestamp is in the future
    #[error("Timestamp {timestamp} is in the future (now {now})")]
    TimestampInFuture {
        /// Timestamp carried by the payload
        timestamp: u64,
        /// Time of the check
        now: u64,
    },

    /// Invalid public key
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Invalid private key
    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Diffie-Hellman produced a non-contributory result
    #[error("Key agreement failed: {0}")]
    KeyAgreementFailed(String),

    /// Password shorter than the accepted minimum
    #[error("Password too short: need at least {min} bytes")]
    PasswordTooShort {
        /// Minimum length in bytes
        min: usize,
    },

    /// Password hashing failed
    #[error("Key derivation failed: {0}")]
    KdfFailed(String),
}
