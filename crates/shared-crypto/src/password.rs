//! # Password-Derived Keys
//!
//! Argon2id is used twice:
//!
//! - once at startup, to turn the operator passphrase into the
//!   key-encryption-key (KEK) that protects every client and topic key at rest;
//! - for password-registered devices, to derive the device key from a password
//!   that both the operator and the device know.

use crate::symmetric::SecretKey;
use crate::CryptoError;
use argon2::{Algorithm, Argon2, Params, Version};
use shared_types::KEY_LEN;
use zeroize::Zeroizing;

/// Passwords shorter than this are refused.
pub const MIN_PASSWORD_LEN: usize = 16;

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 64 * 1024, // 64 MiB
            iterations: 3,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    /// Cheap parameters for tests. Never use in production.
    pub fn for_testing() -> Self {
        Self {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Derive a 32-byte key from `password` and `salt` with Argon2id.
///
/// # Errors
///
/// - `CryptoError::PasswordTooShort` below `MIN_PASSWORD_LEN`
/// - `CryptoError::KdfFailed` on invalid parameters or a salt under 8 bytes
pub fn derive_key_from_password(
    password: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>, CryptoError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(CryptoError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }

    let argon_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| CryptoError::KdfFailed(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon_params);

    let mut out = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password, salt, &mut out[..])
        .map_err(|e| CryptoError::KdfFailed(e.to_string()))?;
    Ok(out)
}

/// Server-wide key-encryption-key.
///
/// Derived once per process and handed to whoever encrypts or decrypts stored
/// keys. Never persisted.
#[derive(Clone, Debug)]
pub struct KeyEncryptionKey(SecretKey);

impl KeyEncryptionKey {
    /// Derive the KEK from the operator passphrase.
    pub fn derive(passphrase: &[u8], salt: &[u8], params: &KdfParams) -> Result<Self, CryptoError> {
        let key = derive_key_from_password(passphrase, salt, params)?;
        Ok(Self(SecretKey::from_bytes(*key)))
    }

    /// Wrap an existing key (tests and tooling).
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(SecretKey::from_bytes(bytes))
    }

    /// Encrypt a key for storage.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.0.seal(plaintext)
    }

    /// Decrypt a stored key.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        self.0.open(ciphertext).map(Zeroizing::new)
    }
}
