//! # E4Key - Key-Protection Strategy
//!
//! A closed set of two modes behind one contract. The orchestration layer
//! never looks inside; it only calls the operations below.
//!
//! | Operation | Symmetric | PubKey |
//! |-----------|-----------|--------|
//! | client key | 32-byte secret | 64-byte Ed25519 private key |
//! | stored key | same secret | 32-byte Ed25519 public key |
//! | command secret | the client key | `SHA3-256(X25519(c2_sk, mont(device_pk)))` |
//! | message secret | topic key | topic key |
//!
//! In PubKey mode the C2 long-term Curve25519 pair is loaded from the
//! [`C2KeyStore`] when the key is built, or generated and persisted if the
//! store is empty.

use crate::domain::errors::KeyError;
use crate::domain::rotation::C2KeyRotationTx;
use crate::ports::outbound::C2KeyStore;
use c2_01_command_codec::{Command, IdentityKeyMaterial};
use parking_lot::RwLock;
use shared_crypto::signatures::PASSWORD_KEY_SALT;
use shared_crypto::{
    derive_key_from_password, derive_shared_secret, protect, unprotect, Ed25519KeyPair,
    Ed25519PublicKey, KdfParams, SecretKey, X25519KeyPair,
};
use shared_types::{CURVE25519_KEY_LEN, KEY_LEN};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// A fresh identity key in both of its forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedKey {
    /// What the device receives.
    pub client_key: IdentityKeyMaterial,
    /// What the server stores (encrypted under the KEK).
    pub stored_key: Vec<u8>,
}

/// State behind the Public-Key mode.
#[derive(Clone)]
pub struct PubKeyState {
    c2_keypair: Arc<RwLock<X25519KeyPair>>,
    store: Arc<dyn C2KeyStore>,
    kdf: KdfParams,
}

/// Key-protection strategy.
#[derive(Clone)]
pub enum E4Key {
    /// Pre-shared symmetric keys.
    Symmetric { kdf: KdfParams },
    /// Ed25519 device identities, X25519 with the C2 long-term key.
    PubKey(PubKeyState),
}

impl E4Key {
    /// Symmetric mode with default Argon2id parameters.
    pub fn symmetric() -> Self {
        E4Key::Symmetric {
            kdf: KdfParams::default(),
        }
    }

    /// Public-Key mode. Loads the C2 key pair from `store`, generating and
    /// persisting a new one if the store is empty.
    ///
    /// # Errors
    ///
    /// `KeyError::KeyStore` if the store cannot be read or written.
    pub fn pubkey(store: Arc<dyn C2KeyStore>) -> Result<Self, KeyError> {
        let keypair = match store.load_active()? {
            Some(secret) => {
                debug!("Loaded C2 key pair from key store");
                X25519KeyPair::from_secret_bytes(*secret)
            }
            None => {
                let keypair = X25519KeyPair::generate();
                store.store_active(&keypair.secret_bytes())?;
                info!(
                    c2_public_key = %hex_prefix(&keypair.public_bytes()),
                    "Generated new C2 key pair"
                );
                keypair
            }
        };

        Ok(E4Key::PubKey(PubKeyState {
            c2_keypair: Arc::new(RwLock::new(keypair)),
            store,
            kdf: KdfParams::default(),
        }))
    }

    /// Replace the Argon2id parameters used by `key_from_password`.
    pub fn with_kdf_params(mut self, params: KdfParams) -> Self {
        match &mut self {
            E4Key::Symmetric { kdf } => *kdf = params,
            E4Key::PubKey(state) => state.kdf = params,
        }
        self
    }

    /// Whether this is the Public-Key mode.
    pub fn is_pubkey_mode(&self) -> bool {
        matches!(self, E4Key::PubKey(_))
    }

    /// Short mode name for logs and configuration.
    pub fn mode_name(&self) -> &'static str {
        match self {
            E4Key::Symmetric { .. } => "symmetric",
            E4Key::PubKey(_) => "pubkey",
        }
    }

    // =========================================================================
    // PROTECTION
    // =========================================================================

    /// Protect an encoded command for the device whose stored key is `client_key`.
    ///
    /// # Errors
    ///
    /// - `KeyError::InvalidKey` if `client_key` fails `validate_key`
    /// - `KeyError::CryptoFailure` if key agreement or encryption fails
    pub fn protect_command(
        &self,
        command: &Command,
        client_key: &[u8],
    ) -> Result<Vec<u8>, KeyError> {
        self.validate_key(client_key)?;
        let payload = command.to_bytes();

        match self {
            E4Key::Symmetric { .. } => Ok(protect(client_key, &payload)?),
            E4Key::PubKey(state) => {
                let device_key = Ed25519PublicKey::from_bytes(client_key)?;
                let device_curve = device_key.to_curve25519()?;
                let secret = {
                    let keypair = state.c2_keypair.read();
                    derive_shared_secret(keypair.secret(), &device_curve)?
                };
                Ok(protect(&secret[..], &payload)?)
            }
        }
    }

    /// Protect a topic payload under the topic key. Same in both modes.
    pub fn protect_message(&self, payload: &[u8], topic_key: &[u8]) -> Result<Vec<u8>, KeyError> {
        validate_symmetric(topic_key)?;
        Ok(protect(topic_key, payload)?)
    }

    /// Recover a topic payload protected with `protect_message`.
    pub fn unprotect_message(
        &self,
        protected: &[u8],
        topic_key: &[u8],
    ) -> Result<Vec<u8>, KeyError> {
        validate_symmetric(topic_key)?;
        Ok(unprotect(topic_key, protected)?)
    }

    // =========================================================================
    // KEYS
    // =========================================================================

    /// Check a stored client key for this mode.
    ///
    /// Symmetric: 32 bytes, not all zero. PubKey: a well-formed Ed25519 point
    /// that is not of small order.
    pub fn validate_key(&self, key: &[u8]) -> Result<(), KeyError> {
        match self {
            E4Key::Symmetric { .. } => validate_symmetric(key),
            E4Key::PubKey(_) => Ed25519PublicKey::from_bytes(key)
                .map(|_| ())
                .map_err(KeyError::from),
        }
    }

    /// Generate a fresh identity key.
    pub fn random_key(&self) -> GeneratedKey {
        match self {
            E4Key::Symmetric { .. } => {
                let key = SecretKey::generate();
                GeneratedKey {
                    client_key: IdentityKeyMaterial::Symmetric(*key.as_bytes()),
                    stored_key: key.as_bytes().to_vec(),
                }
            }
            E4Key::PubKey(_) => ed25519_generated(&Ed25519KeyPair::generate()),
        }
    }

    /// Derive an identity key from a password shared with the device.
    ///
    /// # Errors
    ///
    /// `KeyError::InvalidKey` for passwords shorter than 16 bytes.
    pub fn key_from_password(&self, password: &str) -> Result<GeneratedKey, KeyError> {
        match self {
            E4Key::Symmetric { kdf } => {
                let key = derive_key_from_password(password.as_bytes(), PASSWORD_KEY_SALT, kdf)?;
                Ok(GeneratedKey {
                    client_key: IdentityKeyMaterial::Symmetric(*key),
                    stored_key: key.to_vec(),
                })
            }
            E4Key::PubKey(state) => {
                let keypair = Ed25519KeyPair::from_password(password.as_bytes(), &state.kdf)?;
                Ok(ed25519_generated(&keypair))
            }
        }
    }

    // =========================================================================
    // C2 KEY PAIR
    // =========================================================================

    /// Public half of the active C2 key pair.
    pub fn c2_public_key(&self) -> Result<[u8; CURVE25519_KEY_LEN], KeyError> {
        match self {
            E4Key::Symmetric { .. } => Err(KeyError::NotPubKeyMode),
            E4Key::PubKey(state) => Ok(state.c2_keypair.read().public_bytes()),
        }
    }

    /// Start replacing the C2 key pair.
    ///
    /// Backs up the active private key through the key store, then generates
    /// the candidate pair in memory. Nothing changes for devices until the
    /// returned transaction is committed.
    ///
    /// # Errors
    ///
    /// - `KeyError::NotPubKeyMode` in Symmetric mode
    /// - `KeyError::KeyStore` if the backup cannot be written
    pub fn begin_c2_key_rotation(&self) -> Result<C2KeyRotationTx, KeyError> {
        let state = match self {
            E4Key::Symmetric { .. } => return Err(KeyError::NotPubKeyMode),
            E4Key::PubKey(state) => state,
        };

        let previous = state.c2_keypair.read().clone();
        state.store.store_backup(&previous.secret_bytes())?;

        let candidate = X25519KeyPair::generate();
        debug!(
            candidate = %hex_prefix(&candidate.public_bytes()),
            "C2 key rotation started"
        );
        Ok(C2KeyRotationTx::new(
            state.c2_keypair.clone(),
            state.store.clone(),
            previous,
            candidate,
        ))
    }
}

impl fmt::Debug for E4Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            E4Key::Symmetric { kdf } => f.debug_struct("Symmetric").field("kdf", kdf).finish(),
            E4Key::PubKey(state) => f
                .debug_struct("PubKey")
                .field("c2_keypair", &*state.c2_keypair.read())
                .field("kdf", &state.kdf)
                .finish_non_exhaustive(),
        }
    }
}

fn validate_symmetric(key: &[u8]) -> Result<(), KeyError> {
    if key.len() != KEY_LEN {
        return Err(KeyError::InvalidKey(format!(
            "expected {} bytes, got {}",
            KEY_LEN,
            key.len()
        )));
    }
    if key.iter().all(|b| *b == 0) {
        return Err(KeyError::InvalidKey("all-zero key".to_string()));
    }
    Ok(())
}

fn ed25519_generated(keypair: &Ed25519KeyPair) -> GeneratedKey {
    GeneratedKey {
        client_key: IdentityKeyMaterial::Ed25519(*keypair.to_private_bytes()),
        stored_key: keypair.public_key().as_bytes().to_vec(),
    }
}

pub(crate) fn hex_prefix(bytes: &[u8]) -> String {
    bytes.iter().take(4).map(|b| format!("{:02x}", b)).collect()
}
