//! # Inbound Ports (Driving Ports)
//!
//! The operator API of the C2 engine. Front ends (HTTP, gRPC, CLI) drive the
//! engine only through [`C2Api`].
//!
//! ## Contract
//!
//! - Operations that notify a device publish first and persist after. A failed
//!   publish leaves storage untouched.
//! - Errors from storage and transport are returned unmodified.
//! - Operations marked *PubKey* fail with `ServiceError::NotPubKeyMode` in
//!   Symmetric mode.

use crate::domain::{ClientSummary, ServiceError};
use async_trait::async_trait;
use shared_types::ClientId;

/// Operator API.
#[async_trait]
pub trait C2Api: Send + Sync {
    // === Clients ===

    /// Register a client with its stored key (symmetric key or Ed25519 public key).
    async fn new_client(&self, name: &str, key: &[u8]) -> Result<ClientId, ServiceError>;

    /// Register a client whose key is derived from a password shared with the device.
    async fn new_client_from_password(
        &self,
        name: &str,
        password: &str,
    ) -> Result<ClientId, ServiceError>;

    /// Forget a client and its edges. The device is not notified.
    async fn remove_client(&self, id: &ClientId) -> Result<(), ServiceError>;

    /// Tell the device to drop every topic key. Storage is unchanged.
    async fn reset_client(&self, id: &ClientId) -> Result<(), ServiceError>;

    /// Give the device a fresh identity key, protected under its current one.
    async fn new_client_key(&self, id: &ClientId) -> Result<(), ServiceError>;

    // === Client <-> topic ===

    async fn new_topic_client(&self, id: &ClientId, topic: &str) -> Result<(), ServiceError>;

    async fn remove_topic_client(&self, id: &ClientId, topic: &str) -> Result<(), ServiceError>;

    // === Topics ===

    async fn new_topic(&self, topic: &str) -> Result<(), ServiceError>;

    async fn remove_topic(&self, topic: &str) -> Result<(), ServiceError>;

    /// Replace a topic key and push it to every linked client.
    async fn new_topic_key(&self, topic: &str) -> Result<(), ServiceError>;

    /// Broadcast a payload protected under the topic key.
    async fn send_message(&self, topic: &str, payload: &[u8]) -> Result<(), ServiceError>;

    /// Subscribe the transport to every stored topic. Returns how many.
    async fn subscribe_all_topics(&self) -> Result<usize, ServiceError>;

    // === Public-Key mode ===

    /// *PubKey*: send `source`'s public key to `target`.
    async fn send_client_pubkey(
        &self,
        source: &ClientId,
        target: &ClientId,
    ) -> Result<(), ServiceError>;

    /// *PubKey*: tell `target` to forget `source`'s public key.
    async fn remove_client_pubkey(
        &self,
        source: &ClientId,
        target: &ClientId,
    ) -> Result<(), ServiceError>;

    /// *PubKey*: tell `target` to forget every peer public key.
    async fn reset_client_pubkeys(&self, target: &ClientId) -> Result<(), ServiceError>;

    /// *PubKey*: rotate the C2 key pair, distributing the new public key to
    /// every client. Commits only when every client was reached.
    async fn new_c2_key(&self) -> Result<(), ServiceError>;

    // === Listings ===

    async fn count_topics_for_client(&self, id: &ClientId) -> Result<usize, ServiceError>;

    async fn get_topics_for_client(
        &self,
        id: &ClientId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<String>, ServiceError>;

    async fn count_clients_for_topic(&self, topic: &str) -> Result<usize, ServiceError>;

    async fn get_clients_for_topic(
        &self,
        topic: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ClientSummary>, ServiceError>;

    async fn count_clients(&self) -> Result<usize, ServiceError>;

    async fn get_clients(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ClientSummary>, ServiceError>;

    async fn count_topics(&self) -> Result<usize, ServiceError>;

    async fn get_topics(&self, offset: usize, limit: usize) -> Result<Vec<String>, ServiceError>;
}
