//! # Key Layout
//!
//! | Prefix | Key | Value |
//! |--------|-----|-------|
//! | `c:` | `c:{id}` | `ClientRecord` |
//! | `n:` | `n:{name}` | `ClientId` |
//! | `t:` | `t:{name}` | `TopicRecord` |
//! | `ec:` | `ec:{id}{topic}` | empty |
//! | `et:` | `et:{len16}{topic}{id}` | empty |
//!
//! Edges are written in both directions in the same batch. The topic-side
//! edge carries a big-endian length so that a topic name can never be a
//! prefix of another topic's edges.

use shared_types::{ClientId, ID_LEN};

/// Key namespaces in the key-value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPrefix {
    /// Client record by id
    Client,
    /// Client id by name
    ClientName,
    /// Topic record by name
    Topic,
    /// Edge keyed by client first
    ClientEdge,
    /// Edge keyed by topic first
    TopicEdge,
}

impl KeyPrefix {
    /// Get the byte prefix for this key type.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            KeyPrefix::Client => b"c:",
            KeyPrefix::ClientName => b"n:",
            KeyPrefix::Topic => b"t:",
            KeyPrefix::ClientEdge => b"ec:",
            KeyPrefix::TopicEdge => b"et:",
        }
    }

    /// Build a full key with the given suffix.
    pub fn key(&self, suffix: &[u8]) -> Vec<u8> {
        let mut key = self.as_bytes().to_vec();
        key.extend_from_slice(suffix);
        key
    }

    pub fn client_key(id: &ClientId) -> Vec<u8> {
        KeyPrefix::Client.key(id.as_bytes())
    }

    pub fn client_name_key(name: &str) -> Vec<u8> {
        KeyPrefix::ClientName.key(name.as_bytes())
    }

    pub fn topic_key(name: &str) -> Vec<u8> {
        KeyPrefix::Topic.key(name.as_bytes())
    }

    /// Prefix of every edge of one client.
    pub fn client_edges(id: &ClientId) -> Vec<u8> {
        KeyPrefix::ClientEdge.key(id.as_bytes())
    }

    pub fn client_edge_key(id: &ClientId, topic: &str) -> Vec<u8> {
        let mut key = Self::client_edges(id);
        key.extend_from_slice(topic.as_bytes());
        key
    }

    /// Prefix of every edge of one topic.
    pub fn topic_edges(topic: &str) -> Vec<u8> {
        // Names are bounded by MAX_NAME_LEN, well under u16::MAX.
        let len = u16::try_from(topic.len()).unwrap_or(u16::MAX);
        let mut key = KeyPrefix::TopicEdge.key(&len.to_be_bytes());
        key.extend_from_slice(topic.as_bytes());
        key
    }

    pub fn topic_edge_key(topic: &str, id: &ClientId) -> Vec<u8> {
        let mut key = Self::topic_edges(topic);
        key.extend_from_slice(id.as_bytes());
        key
    }

    /// Topic name from a client-side edge key.
    pub fn topic_from_client_edge(key: &[u8]) -> Option<String> {
        let start = KeyPrefix::ClientEdge.as_bytes().len() + ID_LEN;
        key.get(start..)
            .and_then(|name| String::from_utf8(name.to_vec()).ok())
    }

    /// Client id from a topic-side edge key.
    pub fn client_from_topic_edge(key: &[u8]) -> Option<ClientId> {
        let start = key.len().checked_sub(ID_LEN)?;
        ClientId::from_slice(&key[start..]).ok()
    }
}
