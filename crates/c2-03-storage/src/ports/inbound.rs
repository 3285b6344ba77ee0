//! # Inbound Ports (Driving Ports)
//!
//! The storage API the orchestration service consumes.
//!
//! ## Contract
//!
//! - Every `get_*` fails with `DbError::NotFound` when the record is absent.
//! - Inserting an existing client or topic fails with `DbError::AlreadyExists`.
//! - Every mutating call is a single atomic write.
//! - Listings are ordered by name and paginated with `offset` / `limit`.

use crate::domain::entities::{ClientRecord, TopicRecord};
use crate::domain::errors::DbError;
use shared_types::ClientId;

/// Client, topic and edge persistence.
pub trait Database: Send + Sync {
    // === Clients ===

    fn insert_client(&self, record: &ClientRecord) -> Result<(), DbError>;

    fn get_client(&self, id: &ClientId) -> Result<ClientRecord, DbError>;

    fn get_client_by_name(&self, name: &str) -> Result<ClientRecord, DbError>;

    /// Remove the client and every edge it has.
    fn delete_client(&self, id: &ClientId) -> Result<(), DbError>;

    fn update_client_key(&self, id: &ClientId, encrypted_key: &[u8]) -> Result<(), DbError>;

    // === Topics ===

    fn insert_topic(&self, record: &TopicRecord) -> Result<(), DbError>;

    fn get_topic(&self, name: &str) -> Result<TopicRecord, DbError>;

    /// Remove the topic and every edge it has.
    fn delete_topic(&self, name: &str) -> Result<(), DbError>;

    fn update_topic_key(&self, name: &str, encrypted_key: &[u8]) -> Result<(), DbError>;

    // === Edges ===

    /// Link a client to a topic. Linking twice is a no-op.
    fn link(&self, id: &ClientId, topic: &str) -> Result<(), DbError>;

    /// Unlink a client from a topic. Fails with `NotFound` when not linked.
    fn unlink(&self, id: &ClientId, topic: &str) -> Result<(), DbError>;

    fn is_linked(&self, id: &ClientId, topic: &str) -> Result<bool, DbError>;

    // === Listings ===

    fn count_topics_for_client(&self, id: &ClientId) -> Result<usize, DbError>;

    fn get_topics_for_client(
        &self,
        id: &ClientId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<TopicRecord>, DbError>;

    fn count_clients_for_topic(&self, topic: &str) -> Result<usize, DbError>;

    fn get_clients_for_topic(
        &self,
        topic: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ClientRecord>, DbError>;

    fn count_clients(&self) -> Result<usize, DbError>;

    fn get_clients(&self, offset: usize, limit: usize) -> Result<Vec<ClientRecord>, DbError>;

    fn count_topics(&self) -> Result<usize, DbError>;

    fn get_topics(&self, offset: usize, limit: usize) -> Result<Vec<TopicRecord>, DbError>;
}
