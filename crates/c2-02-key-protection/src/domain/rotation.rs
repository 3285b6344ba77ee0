//! # C2 Key-Rotation Transaction
//!
//! ```text
//!            commit()
//! Created ─────────────→ Committed
//!    │
//!    └─────────────────→ RolledBack
//!            rollback()
//! ```
//!
//! The candidate public key is handed out before commit so every device can
//! be told about it first. A device that misses the new key can no longer
//! read commands once the server commits; rollback is the recovery path.
//!
//! A commit is final once the candidate is persisted; a stale backup left
//! behind is only logged. A rollback, or a commit whose candidate write fails,
//! leaves the transaction in `Created`, so the caller may retry or take the
//! other branch.

use crate::domain::e4key::hex_prefix;
use crate::domain::errors::RotationError;
use crate::ports::outbound::C2KeyStore;
use parking_lot::RwLock;
use shared_crypto::X25519KeyPair;
use shared_types::CURVE25519_KEY_LEN;
use std::sync::Arc;
use tracing::{info, warn};

/// Lifecycle of a rotation transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationState {
    Created,
    Committed,
    RolledBack,
}

/// Staged replacement of the C2 long-term key pair. Single use.
pub struct C2KeyRotationTx {
    state: RotationState,
    active: Arc<RwLock<X25519KeyPair>>,
    store: Arc<dyn C2KeyStore>,
    previous: X25519KeyPair,
    candidate: X25519KeyPair,
}

impl C2KeyRotationTx {
    pub(crate) fn new(
        active: Arc<RwLock<X25519KeyPair>>,
        store: Arc<dyn C2KeyStore>,
        previous: X25519KeyPair,
        candidate: X25519KeyPair,
    ) -> Self {
        Self {
            state: RotationState::Created,
            active,
            store,
            previous,
            candidate,
        }
    }

    /// Candidate public key, to be distributed before `commit`.
    pub fn new_public_key(&self) -> [u8; CURVE25519_KEY_LEN] {
        self.candidate.public_bytes()
    }

    /// Public key that was active when the transaction started.
    pub fn previous_public_key(&self) -> [u8; CURVE25519_KEY_LEN] {
        self.previous.public_bytes()
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    /// Make the candidate the active pair. Irreversible.
    ///
    /// Persists the candidate, swaps the in-memory pair, then discards the
    /// backup. Once the candidate is on disk the in-memory pair must follow it,
    /// so a failure to delete the backup does not fail the commit.
    ///
    /// # Errors
    ///
    /// - `RotationError::AlreadyFinalized` after commit or rollback
    /// - `RotationError::KeyStore` if the candidate cannot be persisted
    pub fn commit(&mut self) -> Result<(), RotationError> {
        self.ensure_open()?;

        self.store.store_active(&self.candidate.secret_bytes())?;
        *self.active.write() = self.candidate.clone();
        self.state = RotationState::Committed;

        if let Err(e) = self.store.delete_backup() {
            warn!(error = %e, "Failed to discard C2 key backup after commit");
        }
        info!(
            c2_public_key = %hex_prefix(&self.candidate.public_bytes()),
            "C2 key rotation committed"
        );
        Ok(())
    }

    /// Abandon the candidate and restore the backed-up private key.
    ///
    /// The in-memory active pair was never replaced, so only the store changes.
    ///
    /// # Errors
    ///
    /// - `RotationError::AlreadyFinalized` after commit or rollback
    /// - `RotationError::KeyStore` if the store refuses a write
    pub fn rollback(&mut self) -> Result<(), RotationError> {
        self.ensure_open()?;

        let restored = match self.store.load_backup()? {
            Some(secret) => secret,
            None => {
                warn!("C2 key backup missing, restoring from memory");
                self.previous.secret_bytes()
            }
        };
        self.store.store_active(&restored)?;
        self.store.delete_backup()?;

        self.state = RotationState::RolledBack;
        info!(
            c2_public_key = %hex_prefix(&self.previous.public_bytes()),
            "C2 key rotation rolled back"
        );
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), RotationError> {
        match self.state {
            RotationState::Created => Ok(()),
            RotationState::Committed | RotationState::RolledBack => {
                Err(RotationError::AlreadyFinalized)
            }
        }
    }
}

impl std::fmt::Debug for C2KeyRotationTx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("C2KeyRotationTx")
            .field("state", &self.state)
            .field("candidate", &self.candidate)
            .finish_non_exhaustive()
    }
}
