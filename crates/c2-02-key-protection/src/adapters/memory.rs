//! In-memory key store for tests and ephemeral deployments.

use crate::domain::errors::KeyStoreError;
use crate::ports::outbound::{C2KeyStore, C2Secret};
use parking_lot::Mutex;
use shared_types::CURVE25519_KEY_LEN;
use zeroize::Zeroizing;

#[derive(Default)]
struct Slots {
    active: Option<C2Secret>,
    backup: Option<C2Secret>,
    fail_writes: bool,
    fail_deletes: bool,
}

/// Key store held in process memory. Lost on restart.
#[derive(Default)]
pub struct InMemoryKeyStore {
    slots: Mutex<Slots>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write fail with `KeyStoreError::Io`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.slots.lock().fail_writes = fail;
    }

    /// Make every following `delete_backup` fail while writes still succeed.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.slots.lock().fail_deletes = fail;
    }

    /// Whether a backup is currently held.
    pub fn has_backup(&self) -> bool {
        self.slots.lock().backup.is_some()
    }

    fn write(
        &self,
        pick: impl FnOnce(&mut Slots) -> &mut Option<C2Secret>,
        secret: &[u8; CURVE25519_KEY_LEN],
    ) -> Result<(), KeyStoreError> {
        let mut slots = self.slots.lock();
        if slots.fail_writes {
            return Err(KeyStoreError::Io("injected write failure".to_string()));
        }
        *pick(&mut *slots) = Some(Zeroizing::new(*secret));
        Ok(())
    }
}

impl C2KeyStore for InMemoryKeyStore {
    fn load_active(&self) -> Result<Option<C2Secret>, KeyStoreError> {
        Ok(self.slots.lock().active.clone())
    }

    fn store_active(&self, secret: &[u8; CURVE25519_KEY_LEN]) -> Result<(), KeyStoreError> {
        self.write(|s| &mut s.active, secret)
    }

    fn store_backup(&self, secret: &[u8; CURVE25519_KEY_LEN]) -> Result<(), KeyStoreError> {
        self.write(|s| &mut s.backup, secret)
    }

    fn load_backup(&self) -> Result<Option<C2Secret>, KeyStoreError> {
        Ok(self.slots.lock().backup.clone())
    }

    fn delete_backup(&self) -> Result<(), KeyStoreError> {
        let mut slots = self.slots.lock();
        if slots.fail_writes || slots.fail_deletes {
            return Err(KeyStoreError::Io("injected delete failure".to_string()));
        }
        slots.backup = None;
        Ok(())
    }
}
