//! # Outbound Ports (Driven Ports)
//!
//! Durable staging area for the C2 long-term private key.
//!
//! Production: `FileKeyStore` (write-temp-then-rename, backup at `<path>.old`)
//! Testing: `InMemoryKeyStore`

use crate::domain::errors::KeyStoreError;
use shared_types::CURVE25519_KEY_LEN;
use zeroize::Zeroizing;

/// Raw Curve25519 private key as held by a key store.
pub type C2Secret = Zeroizing<[u8; CURVE25519_KEY_LEN]>;

/// Persistence for the active C2 private key and its rotation backup.
///
/// ## Contract
///
/// - `store_active` replaces the active key atomically: a reader sees either
///   the old or the new key, never a mix.
/// - The backup is recoverable from `store_backup` until `delete_backup`.
pub trait C2KeyStore: Send + Sync {
    /// Active private key, `None` before first use.
    fn load_active(&self) -> Result<Option<C2Secret>, KeyStoreError>;

    /// Replace the active private key.
    fn store_active(&self, secret: &[u8; CURVE25519_KEY_LEN]) -> Result<(), KeyStoreError>;

    /// Save a copy of the private key being rotated out.
    fn store_backup(&self, secret: &[u8; CURVE25519_KEY_LEN]) -> Result<(), KeyStoreError>;

    /// Backup saved by `store_backup`, if any.
    fn load_backup(&self) -> Result<Option<C2Secret>, KeyStoreError>;

    /// Discard the backup. Succeeds when there is none.
    fn delete_backup(&self) -> Result<(), KeyStoreError>;
}
