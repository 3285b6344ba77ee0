//! # Storage Service
//!
//! `KvDatabase` implements the [`Database`] port over any [`KeyValueStore`].
//!
//! ## Write Discipline
//!
//! Every mutating call reads what it needs and writes a single atomic batch
//! while holding the store's write lock. A failed batch leaves the store
//! untouched.


use crate::adapters::InMemoryKVStore;
use crate::domain::entities::{ClientRecord, TopicRecord};
use crate::domain::errors::DbError;
use crate::domain::keys::KeyPrefix;
use crate::ports::inbound::Database;
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::ClientId;
use tracing::debug;

/// [`Database`] backed by a key-value store.
pub struct KvDatabase<S: KeyValueStore> {
    store: RwLock<S>,
}

impl KvDatabase<InMemoryKVStore> {
    /// Database over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::new(InMemoryKVStore::new())
    }
}

impl<S: KeyValueStore> KvDatabase<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }

    /// Run `f` with exclusive access to the underlying store.
    pub fn with_store<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        f(&mut *self.store.write())
    }

    // =========================================================================
    // Record helpers
    // =========================================================================

    fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, DbError> {
        Ok(bincode::serialize(value)?)
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, DbError> {
        Ok(bincode::deserialize(bytes)?)
    }

    fn load_client(store: &S, id: &ClientId) -> Result<ClientRecord, DbError> {
        match store.get(&KeyPrefix::client_key(id))? {
            Some(bytes) => Self::decode(&bytes),
            None => Err(DbError::client_not_found(id)),
        }
    }

    fn load_topic(store: &S, name: &str) -> Result<TopicRecord, DbError> {
        match store.get(&KeyPrefix::topic_key(name))? {
            Some(bytes) => Self::decode(&bytes),
            None => Err(DbError::topic_not_found(name)),
        }
    }

    /// Topic names linked to `id`, in name order.
    fn linked_topics(store: &S, id: &ClientId) -> Result<Vec<String>, DbError> {
        let entries = store.prefix_scan(&KeyPrefix::client_edges(id))?;
        entries
            .iter()
            .map(|(key, _)| {
                KeyPrefix::topic_from_client_edge(key)
                    .ok_or_else(|| DbError::Serialization("malformed client edge key".to_string()))
            })
            .collect()
    }

    /// Client ids linked to `topic`.
    fn linked_clients(store: &S, topic: &str) -> Result<Vec<ClientId>, DbError> {
        let entries = store.prefix_scan(&KeyPrefix::topic_edges(topic))?;
        entries
            .iter()
            .map(|(key, _)| {
                KeyPrefix::client_from_topic_edge(key)
                    .ok_or_else(|| DbError::Serialization("malformed topic edge key".to_string()))
            })
            .collect()
    }

    fn edge_deletes(id: &ClientId, topic: &str) -> [BatchOperation; 2] {
        [
            BatchOperation::delete(KeyPrefix::client_edge_key(id, topic)),
            BatchOperation::delete(KeyPrefix::topic_edge_key(topic, id)),
        ]
    }

    fn page<T>(items: Vec<T>, offset: usize, limit: usize) -> Vec<T> {
        items.into_iter().skip(offset).take(limit).collect()
    }
}

impl<S: KeyValueStore> Database for KvDatabase<S> {
    // =========================================================================
    // Clients
    // =========================================================================

    fn insert_client(&self, record: &ClientRecord) -> Result<(), DbError> {
        let mut store = self.store.write();
        let key = KeyPrefix::client_key(&record.id);
        let name_key = KeyPrefix::client_name_key(&record.name);
        if store.exists(&key)? || store.exists(&name_key)? {
            return Err(DbError::AlreadyExists {
                entity: "client",
                key: record.name.clone(),
            });
        }

        store.atomic_batch_write(vec![
            BatchOperation::put(key, Self::encode(record)?),
            BatchOperation::put(name_key, record.id.as_bytes().to_vec()),
        ])?;
        debug!(client_id = %record.id, "client inserted");
        Ok(())
    }

    fn get_client(&self, id: &ClientId) -> Result<ClientRecord, DbError> {
        let store = self.store.read();
        Self::load_client(&store, id)
    }

    fn get_client_by_name(&self, name: &str) -> Result<ClientRecord, DbError> {
        let store = self.store.read();
        let id_bytes = store
            .get(&KeyPrefix::client_name_key(name))?
            .ok_or_else(|| DbError::client_not_found(name))?;
        let id = ClientId::from_slice(&id_bytes)
            .map_err(|e| DbError::Serialization(e.to_string()))?;
        Self::load_client(&store, &id)
    }

    fn delete_client(&self, id: &ClientId) -> Result<(), DbError> {
        let mut store = self.store.write();
        let record = Self::load_client(&store, id)?;
        let topics = Self::linked_topics(&store, id)?;

        let mut ops = vec![
            BatchOperation::delete(KeyPrefix::client_key(id)),
            BatchOperation::delete(KeyPrefix::client_name_key(&record.name)),
        ];
        for topic in &topics {
            ops.extend(Self::edge_deletes(id, topic));
        }
        store.atomic_batch_write(ops)?;
        debug!(client_id = %id, edges = topics.len(), "client deleted");
        Ok(())
    }

    fn update_client_key(&self, id: &ClientId, encrypted_key: &[u8]) -> Result<(), DbError> {
        let mut store = self.store.write();
        let mut record = Self::load_client(&store, id)?;
        record.encrypted_key = encrypted_key.to_vec();
        store.put(&KeyPrefix::client_key(id), &Self::encode(&record)?)?;
        Ok(())
    }

    // =========================================================================
    // Topics
    // =========================================================================

    fn insert_topic(&self, record: &TopicRecord) -> Result<(), DbError> {
        let mut store = self.store.write();
        let key = KeyPrefix::topic_key(&record.name);
        if store.exists(&key)? {
            return Err(DbError::AlreadyExists {
                entity: "topic",
                key: record.name.clone(),
            });
        }
        store.put(&key, &Self::encode(record)?)?;
        debug!(topic = %record.name, "topic inserted");
        Ok(())
    }

    fn get_topic(&self, name: &str) -> Result<TopicRecord, DbError> {
        let store = self.store.read();
        Self::load_topic(&store, name)
    }

    fn delete_topic(&self, name: &str) -> Result<(), DbError> {
        let mut store = self.store.write();
        Self::load_topic(&store, name)?;
        let clients = Self::linked_clients(&store, name)?;

        let mut ops = vec![BatchOperation::delete(KeyPrefix::topic_key(name))];
        for id in &clients {
            ops.extend(Self::edge_deletes(id, name));
        }
        store.atomic_batch_write(ops)?;
        debug!(topic = %name, edges = clients.len(), "topic deleted");
        Ok(())
    }

    fn update_topic_key(&self, name: &str, encrypted_key: &[u8]) -> Result<(), DbError> {
        let mut store = self.store.write();
        let mut record = Self::load_topic(&store, name)?;
        record.encrypted_key = encrypted_key.to_vec();
        store.put(&KeyPrefix::topic_key(name), &Self::encode(&record)?)?;
        Ok(())
    }

    // =========================================================================
    // Edges
    // =========================================================================

    fn link(&self, id: &ClientId, topic: &str) -> Result<(), DbError> {
        let mut store = self.store.write();
        Self::load_client(&store, id)?;
        Self::load_topic(&store, topic)?;

        store.atomic_batch_write(vec![
            BatchOperation::put(KeyPrefix::client_edge_key(id, topic), Vec::new()),
            BatchOperation::put(KeyPrefix::topic_edge_key(topic, id), Vec::new()),
        ])?;
        Ok(())
    }

    fn unlink(&self, id: &ClientId, topic: &str) -> Result<(), DbError> {
        let mut store = self.store.write();
        if !store.exists(&KeyPrefix::client_edge_key(id, topic))? {
            return Err(DbError::NotFound {
                entity: "edge",
                key: format!("{}/{}", id, topic),
            });
        }
        store.atomic_batch_write(Self::edge_deletes(id, topic).to_vec())?;
        Ok(())
    }

    fn is_linked(&self, id: &ClientId, topic: &str) -> Result<bool, DbError> {
        let store = self.store.read();
        Ok(store.exists(&KeyPrefix::client_edge_key(id, topic))?)
    }

    // =========================================================================
    // Listings
    // =========================================================================

    fn count_topics_for_client(&self, id: &ClientId) -> Result<usize, DbError> {
        let store = self.store.read();
        Self::load_client(&store, id)?;
        Ok(store.prefix_scan(&KeyPrefix::client_edges(id))?.len())
    }

    fn get_topics_for_client(
        &self,
        id: &ClientId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<TopicRecord>, DbError> {
        let store = self.store.read();
        Self::load_client(&store, id)?;
        // Edge keys share the client prefix, so scan order is name order.
        Self::page(Self::linked_topics(&store, id)?, offset, limit)
            .iter()
            .map(|name| Self::load_topic(&store, name))
            .collect()
    }

    fn count_clients_for_topic(&self, topic: &str) -> Result<usize, DbError> {
        let store = self.store.read();
        Self::load_topic(&store, topic)?;
        Ok(store.prefix_scan(&KeyPrefix::topic_edges(topic))?.len())
    }

    fn get_clients_for_topic(
        &self,
        topic: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<ClientRecord>, DbError> {
        let store = self.store.read();
        Self::load_topic(&store, topic)?;
        let mut clients = Self::linked_clients(&store, topic)?
            .iter()
            .map(|id| Self::load_client(&store, id))
            .collect::<Result<Vec<_>, _>>()?;
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(Self::page(clients, offset, limit))
    }

    fn count_clients(&self) -> Result<usize, DbError> {
        let store = self.store.read();
        Ok(store.prefix_scan(KeyPrefix::ClientName.as_bytes())?.len())
    }

    fn get_clients(&self, offset: usize, limit: usize) -> Result<Vec<ClientRecord>, DbError> {
        let store = self.store.read();
        // The name index is ordered by name; resolve through it.
        let index = store.prefix_scan(KeyPrefix::ClientName.as_bytes())?;
        Self::page(index, offset, limit)
            .iter()
            .map(|(_, id_bytes)| {
                let id = ClientId::from_slice(id_bytes)
                    .map_err(|e| DbError::Serialization(e.to_string()))?;
                Self::load_client(&store, &id)
            })
            .collect()
    }

    fn count_topics(&self) -> Result<usize, DbError> {
        let store = self.store.read();
        Ok(store.prefix_scan(KeyPrefix::Topic.as_bytes())?.len())
    }

    fn get_topics(&self, offset: usize, limit: usize) -> Result<Vec<TopicRecord>, DbError> {
        let store = self.store.read();
        let entries = store.prefix_scan(KeyPrefix::Topic.as_bytes())?;
        Self::page(entries, offset, limit)
            .iter()
            .map(|(_, bytes)| Self::decode(bytes))
            .collect()
    }
}
