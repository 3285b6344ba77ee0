//! # Service Wiring
//!
//! Builds every collaborator of [`E4Service`] from a [`RuntimeConfig`].
//!
//! | Collaborator | Source |
//! |--------------|--------|
//! | KEK | Argon2id over `C2_PASSPHRASE` and `C2_KEK_SALT` |
//! | `E4Key` | `C2_CRYPTO_MODE`; PubKey mode loads `C2_C2_KEY_PATH` |
//! | `Database` | RocksDB at `C2_DB_PATH` (`rocksdb` feature), else in memory |
//! | `PubSubClient` | supplied by the caller |

use crate::config::{CryptoMode, RuntimeConfig};
use crate::RuntimeError;
use c2_02_key_protection::{E4Key, FileKeyStore};
use c2_03_storage::KvDatabase;
use c2_04_orchestration::{E4Service, PubSubClient, ServiceDependencies};
use shared_crypto::KeyEncryptionKey;
use std::sync::Arc;
use tracing::info;

#[cfg(feature = "rocksdb")]
pub type C2Store = c2_03_storage::RocksDbStore;

#[cfg(not(feature = "rocksdb"))]
pub type C2Store = c2_03_storage::InMemoryKVStore;

/// The service as wired by the runtime.
pub type C2Service<T> = E4Service<KvDatabase<C2Store>, T>;

/// Derive the KEK. Slow by construction; called once at startup.
pub fn derive_kek(config: &RuntimeConfig) -> Result<KeyEncryptionKey, RuntimeError> {
    let kek = KeyEncryptionKey::derive(
        config.passphrase.as_bytes(),
        config.kek_salt.as_bytes(),
        &config.kdf,
    )?;
    info!("KEK derived");
    Ok(kek)
}

/// Build the key-protection strategy for the configured mode.
pub fn build_e4key(config: &RuntimeConfig) -> Result<E4Key, RuntimeError> {
    let e4key = match config.crypto_mode {
        CryptoMode::Symmetric => E4Key::symmetric(),
        CryptoMode::PubKey => {
            let store = Arc::new(FileKeyStore::new(&config.c2_key_path));
            E4Key::pubkey(store)?
        }
    };
    info!(mode = e4key.mode_name(), "Key protection ready");
    Ok(e4key)
}

#[cfg(feature = "rocksdb")]
pub fn open_store(config: &RuntimeConfig) -> Result<C2Store, RuntimeError> {
    let store = c2_03_storage::RocksDbStore::open_default(&config.db_path)?;
    info!(path = %config.db_path.display(), "RocksDB store opened");
    Ok(store)
}

#[cfg(not(feature = "rocksdb"))]
pub fn open_store(_config: &RuntimeConfig) -> Result<C2Store, RuntimeError> {
    tracing::warn!("Using in-memory store; records are lost on shutdown");
    Ok(c2_03_storage::InMemoryKVStore::new())
}

/// Wire the service around `transport`.
pub fn build_service<T: PubSubClient>(
    config: &RuntimeConfig,
    transport: Arc<T>,
) -> Result<C2Service<T>, RuntimeError> {
    let kek = derive_kek(config)?;
    let e4key = build_e4key(config)?;
    let db = Arc::new(KvDatabase::new(open_store(config)?));

    Ok(E4Service::new(ServiceDependencies {
        db,
        transport,
        e4key,
        kek,
    }))
}
