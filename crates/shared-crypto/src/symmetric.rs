//! # Symmetric Encryption
//!
//! XChaCha20-Poly1305 in two framings:
//!
//! - **Protected** (`protect` / `unprotect`): `timestamp ‖ nonce ‖ ciphertext`,
//!   with the little-endian timestamp bound as associated data. Used for
//!   everything sent to devices or topics.
//! - **Sealed** (`SecretKey::seal` / `SecretKey::open`): `nonce ‖ ciphertext`,
//!   no timestamp. Used for keys at rest.

use crate::CryptoError;
use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    XChaCha20Poly1305, XNonce,
};
use shared_types::{
    KEY_LEN, MAX_FUTURE_SKEW_SECS, MAX_PROTECTED_AGE_SECS, NONCE_LEN, PROTECTED_OVERHEAD, TAG_LEN,
    TIMESTAMP_LEN,
};
use std::time::{SystemTime, UNIX_EPOCH};
use zeroize::Zeroize;

/// Secret key (256-bit).
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretKey([u8; KEY_LEN]);

impl SecretKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; KEY_LEN] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: KEY_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Generate random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, &mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Encrypt `plaintext` as `nonce ‖ ciphertext`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::EncryptionFailed` if encryption fails.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let nonce = random_nonce();
        let ciphertext = encrypt(self, &nonce, plaintext, &[])?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    /// Decrypt a buffer produced by [`SecretKey::seal`].
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::PayloadTooShort` or `CryptoError::DecryptionFailed`.
    pub fn open(&self, sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if sealed.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::PayloadTooShort {
                min: NONCE_LEN + TAG_LEN,
                actual: sealed.len(),
            });
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        decrypt(self, nonce, ciphertext, &[])
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Protect `payload` under a raw 32-byte key, stamped with the current time.
///
/// # Errors
///
/// Returns `CryptoError::InvalidKeyLength` if `key` is not 32 bytes.
pub fn protect(key: &[u8], payload: &[u8]) -> Result<Vec<u8>, CryptoError> {
    protect_at(key, payload, unix_now())
}

/// Protect `payload` under a raw 32-byte key with an explicit timestamp.
pub fn protect_at(key: &[u8], payload: &[u8], timestamp: u64) -> Result<Vec<u8>, CryptoError> {
    let key = SecretKey::from_slice(key)?;
    let ts = timestamp.to_le_bytes();
    let nonce = random_nonce();
    let ciphertext = encrypt(&key, &nonce, payload, &ts)?;

    let mut out = Vec::with_capacity(TIMESTAMP_LEN + NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&ts);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Recover the payload of a protected buffer, checking freshness against the current time.
///
/// # Errors
///
/// - `CryptoError::PayloadTooShort` if the buffer is shorter than the fixed overhead
/// - `CryptoError::TimestampTooOld` / `CryptoError::TimestampInFuture` outside the window
/// - `CryptoError::DecryptionFailed` on authentication failure
pub fn unprotect(key: &[u8], protected: &[u8]) -> Result<Vec<u8>, CryptoError> {
    unprotect_at(key, protected, unix_now())
}

/// Recover the payload of a protected buffer, checking freshness against `now`.
pub fn unprotect_at(key: &[u8], protected: &[u8], now: u64) -> Result<Vec<u8>, CryptoError> {
    let key = SecretKey::from_slice(key)?;
    if protected.len() < PROTECTED_OVERHEAD {
        return Err(CryptoError::PayloadTooShort {
            min: PROTECTED_OVERHEAD,
            actual: protected.len(),
        });
    }

    let (ts_bytes, rest) = protected.split_at(TIMESTAMP_LEN);
    let mut ts = [0u8; TIMESTAMP_LEN];
    ts.copy_from_slice(ts_bytes);
    let timestamp = u64::from_le_bytes(ts);

    if timestamp.saturating_add(MAX_PROTECTED_AGE_SECS) < now {
        return Err(CryptoError::TimestampTooOld { timestamp, now });
    }
    if timestamp > now.saturating_add(MAX_FUTURE_SKEW_SECS) {
        return Err(CryptoError::TimestampInFuture { timestamp, now });
    }

    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
    decrypt(&key, nonce, ciphertext, ts_bytes)
}

fn encrypt(
    key: &SecretKey,
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    cipher
        .encrypt(XNonce::from_slice(nonce), Payload { msg: plaintext, aad })
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
}

fn decrypt(
    key: &SecretKey,
    nonce: &[u8],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());
    cipher
        .decrypt(XNonce::from_slice(nonce), Payload { msg: ciphertext, aad })
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}

fn random_nonce() -> [u8; NONCE_LEN] {
    let mut bytes = [0u8; NONCE_LEN];
    rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, &mut bytes);
    bytes
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_700_000_000;

    #[test]
    fn test_protect_unprotect_roundtrip() {
        let key = SecretKey::generate();
        let plaintext = b"Hello, device!";

        let protected = protect(key.as_bytes(), plaintext).unwrap();
        let recovered = unprotect(key.as_bytes(), &protected).unwrap();

        assert_eq!(recovered, plaintext);
        assert_eq!(protected.len(), PROTECTED_OVERHEAD + plaintext.len());
    }

    #[test]
    fn test_wrong_key_fails() {
        let key1 = SecretKey::generate();
        let key2 = SecretKey::generate();

        let protected = protect(key1.as_bytes(), b"Secret message").unwrap();
        let result = unprotect(key2.as_bytes(), &protected);

        assert!(matches!(result, Err(CryptoError::DecryptionFailed(_))));
    }

    #[test]
    fn test_tampered_timestamp_fails() {
        let key = SecretKey::generate();
        let mut protected = protect_at(key.as_bytes(), b"payload", NOW).unwrap();
        protected[0] ^= 0x01; // still inside the window, but authenticated

        let result = unprotect_at(key.as_bytes(), &protected, NOW);
        assert!(matches!(result, Err(CryptoError::DecryptionFailed(_))));
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = SecretKey::generate();
        let mut protected = protect(key.as_bytes(), b"payload").unwrap();
        let last = protected.len() - 1;
        protected[last] ^= 0xFF;

        assert!(unprotect(key.as_bytes(), &protected).is_err());
    }

    #[test]
    fn test_freshness_window() {
        let key = SecretKey::generate();

        let old = protect_at(key.as_bytes(), b"x", NOW - MAX_PROTECTED_AGE_SECS - 1).unwrap();
        assert!(matches!(
            unprotect_at(key.as_bytes(), &old, NOW),
            Err(CryptoError::TimestampTooOld { .. })
        ));

        let edge = protect_at(key.as_bytes(), b"x", NOW - MAX_PROTECTED_AGE_SECS).unwrap();
        assert!(unprotect_at(key.as_bytes(), &edge, NOW).is_ok());

        let future = protect_at(key.as_bytes(), b"x", NOW + MAX_FUTURE_SKEW_SECS + 1).unwrap();
        assert!(matches!(
            unprotect_at(key.as_bytes(), &future, NOW),
            Err(CryptoError::TimestampInFuture { .. })
        ));
    }

    #[test]
    fn test_short_input_rejected() {
        let key = SecretKey::generate();
        let result = unprotect(key.as_bytes(), &[0u8; PROTECTED_OVERHEAD - 1]);
        assert_eq!(
            result,
            Err(CryptoError::PayloadTooShort {
                min: PROTECTED_OVERHEAD,
                actual: PROTECTED_OVERHEAD - 1
            })
        );
    }

    #[test]
    fn test_bad_key_length_rejected() {
        assert_eq!(
            protect(&[1u8; 31], b"x").unwrap_err(),
            CryptoError::InvalidKeyLength {
                expected: KEY_LEN,
                actual: 31
            }
        );
    }

    #[test]
    fn test_seal_open_roundtrip() {
        let key = SecretKey::generate();
        let sealed = key.seal(b"stored key material").unwrap();
        assert_eq!(key.open(&sealed).unwrap(), b"stored key material");
        assert!(SecretKey::generate().open(&sealed).is_err());
    }

    #[test]
    fn test_nonce_uniqueness() {
        let key = SecretKey::generate();
        let a = key.seal(b"same").unwrap();
        let b = key.seal(b"same").unwrap();
        assert_ne!(a, b);
    }
}
