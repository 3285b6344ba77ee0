//! # X25519 Key Agreement
//!
//! The C2 long-term key pair and the Diffie-Hellman derivation used to
//! protect commands in Public-Key mode. The raw DH output is never used
//! directly; it is hashed with SHA3-256 into a 32-byte symmetric key.

use crate::hashing::sha3_256;
use crate::CryptoError;
use shared_types::CURVE25519_KEY_LEN;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

/// Curve25519 key pair.
#[derive(Clone)]
pub struct X25519KeyPair {
    secret: StaticSecret,
    public: PublicKey,
}

impl X25519KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(rand::rngs::OsRng);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Rebuild a keypair from its private half.
    pub fn from_secret_bytes(bytes: [u8; CURVE25519_KEY_LEN]) -> Self {
        let secret = StaticSecret::from(bytes);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Private half.
    pub fn secret(&self) -> &StaticSecret {
        &self.secret
    }

    /// Private half as bytes (for persistence).
    pub fn secret_bytes(&self) -> Zeroizing<[u8; CURVE25519_KEY_LEN]> {
        Zeroizing::new(self.secret.to_bytes())
    }

    /// Public half as bytes.
    pub fn public_bytes(&self) -> [u8; CURVE25519_KEY_LEN] {
        self.public.to_bytes()
    }
}

impl std::fmt::Debug for X25519KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("X25519KeyPair")
            .field("public", &self.public.as_bytes())
            .finish_non_exhaustive()
    }
}

/// `SHA3-256(X25519(secret, peer_public))`.
///
/// # Errors
///
/// Returns `CryptoError::KeyAgreementFailed` when the peer key has small
/// order and the exchange is not contributory.
pub fn derive_shared_secret(
    secret: &StaticSecret,
    peer_public: &[u8; CURVE25519_KEY_LEN],
) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let shared = secret.diffie_hellman(&PublicKey::from(*peer_public));
    if !shared.was_contributory() {
        return Err(CryptoError::KeyAgreementFailed(
            "non-contributory exchange".to_string(),
        ));
    }
    Ok(Zeroizing::new(sha3_256(shared.as_bytes())))
}
