//! # E4 Service
//!
//! The C2 engine. Implements [`C2Api`](crate::ports::inbound::C2Api) over a
//! [`Database`] and a [`PubSubClient`].
//!
//! ## Operation Template
//!
//! ```text
//! fetch (db) → decrypt (KEK) → build command → protect (E4Key) → publish → persist (db)
//! ```
//!
//! Publishing always precedes persistence. If the publish fails the operation
//! returns the transport error and storage is never touched. There is no
//! locking across an operation: two concurrent operations on the same client
//! or topic may interleave.

mod api;
mod helpers;

use crate::ports::outbound::{Database, PubSubClient};
use c2_02_key_protection::E4Key;
use shared_crypto::KeyEncryptionKey;
use std::sync::Arc;

/// Page size used when an operation walks every client or topic.
pub const LISTING_BATCH: usize = 256;

/// The E4 C2 service.
pub struct E4Service<D: Database, T: PubSubClient> {
    /// Client, topic and edge records.
    pub(crate) db: Arc<D>,
    /// Broker connection.
    pub(crate) transport: Arc<T>,
    /// Active key-protection mode.
    pub(crate) e4key: E4Key,
    /// Encrypts keys at rest.
    pub(crate) kek: KeyEncryptionKey,
}

/// Dependencies for E4Service
pub struct ServiceDependencies<D, T> {
    pub db: Arc<D>,
    pub transport: Arc<T>,
    pub e4key: E4Key,
    pub kek: KeyEncryptionKey,
}

impl<D: Database, T: PubSubClient> E4Service<D, T> {
    /// Create the service from its dependencies.
    pub fn new(deps: ServiceDependencies<D, T>) -> Self {
        Self {
            db: deps.db,
            transport: deps.transport,
            e4key: deps.e4key,
            kek: deps.kek,
        }
    }

    /// The active key-protection mode.
    pub fn e4key(&self) -> &E4Key {
        &self.e4key
    }

    pub fn database(&self) -> &Arc<D> {
        &self.db
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }
}
