//! # Ed25519 Device Keys
//!
//! In Public-Key mode every device owns an Ed25519 key pair. The device gets
//! the 64-byte private key (seed followed by public key); the server keeps
//! only the public key and converts it to Montgomery form for X25519.
//!
//! ## Security Properties
//!
//! - Public keys of small order (the identity included) are rejected
//! - The 64-byte private encoding is checked for seed/public consistency

use crate::password::{derive_key_from_password, KdfParams};
use crate::CryptoError;
use ed25519_dalek::{SigningKey, VerifyingKey};
use shared_types::{CURVE25519_KEY_LEN, ED25519_PRIVATE_KEY_LEN, ED25519_PUBLIC_KEY_LEN};
use zeroize::Zeroizing;

/// Salt for password-derived device keys. Devices use the same constant.
pub const PASSWORD_KEY_SALT: &[u8] = b"e4.device.password.v1";

/// Ed25519 public key (32 bytes), validated on construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ed25519PublicKey([u8; ED25519_PUBLIC_KEY_LEN]);

impl Ed25519PublicKey {
    /// Create from bytes, rejecting malformed and small-order points.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: [u8; ED25519_PUBLIC_KEY_LEN] =
            bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
                expected: ED25519_PUBLIC_KEY_LEN,
                actual: bytes.len(),
            })?;
        let verifying_key = VerifyingKey::from_bytes(&arr)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        if verifying_key.is_weak() {
            return Err(CryptoError::InvalidPublicKey(
                "point has small order".to_string(),
            ));
        }
        Ok(Self(arr))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; ED25519_PUBLIC_KEY_LEN] {
        &self.0
    }

    /// Montgomery (Curve25519) form of this key, for X25519.
    pub fn to_curve25519(&self) -> Result<[u8; CURVE25519_KEY_LEN], CryptoError> {
        let verifying_key = VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;
        Ok(verifying_key.to_montgomery().to_bytes())
    }
}

/// Ed25519 keypair. The signing key zeroizes itself on drop.
pub struct Ed25519KeyPair {
    signing_key: SigningKey,
}

impl Ed25519KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut rand::rngs::OsRng);
        Self { signing_key }
    }

    /// Create from secret seed (32 bytes).
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Derive a keypair from a password. The seed is Argon2id over the password.
    pub fn from_password(password: &[u8], params: &KdfParams) -> Result<Self, CryptoError> {
        let seed = derive_key_from_password(password, PASSWORD_KEY_SALT, params)?;
        Ok(Self::from_seed(&seed))
    }

    /// Parse the 64-byte private encoding (seed ‖ public key).
    pub fn from_private_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let arr: &[u8; ED25519_PRIVATE_KEY_LEN] =
            bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
                expected: ED25519_PRIVATE_KEY_LEN,
                actual: bytes.len(),
            })?;
        let signing_key = SigningKey::from_keypair_bytes(arr)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self { signing_key })
    }

    /// 64-byte private encoding (seed ‖ public key).
    pub fn to_private_bytes(&self) -> Zeroizing<[u8; ED25519_PRIVATE_KEY_LEN]> {
        Zeroizing::new(self.signing_key.to_keypair_bytes())
    }

    /// Get public key.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Curve25519 scalar bytes for X25519 with this identity.
    pub fn to_curve25519_secret(&self) -> Zeroizing<[u8; CURVE25519_KEY_LEN]> {
        Zeroizing::new(self.signing_key.to_scalar_bytes())
    }
}
