//! # C2 Storage (c2-03)
//!
//! Persistence for clients, topics and the client-topic edges between them.
//!
//! ## Data Model
//!
//! | Record | Identity | Holds |
//! |--------|----------|-------|
//! | Client | `ClientId` (derived from name) | encrypted identity key |
//! | Topic | name | `TopicHash`, encrypted topic key |
//! | Edge | (client, topic) | nothing; presence means "client holds the topic key" |
//!
//! Keys are stored encrypted under the KEK. This crate only moves ciphertext.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Records, key layout, errors
//! - `ports/` - `Database` (inbound) and `KeyValueStore` (outbound)
//! - `adapters/` - In-memory store, RocksDB store (`rocksdb` feature)
//! - `service/` - `KvDatabase`, the `Database` implementation
//!
//! ## Usage
//!
//! ```ignore
//! use c2_03_storage::{ClientRecord, Database, KvDatabase};
//!
//! let db = KvDatabase::in_memory();
//! db.insert_client(&ClientRecord::new("c1", encrypted_key))?;
//! db.link(&ClientId::from_name("c1"), "sensors/temp")?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::InMemoryKVStore;
#[cfg(feature = "rocksdb")]
pub use adapters::{RocksDbConfig, RocksDbStore};
pub use domain::{ClientRecord, DbError, KVStoreError, KeyPrefix, TopicRecord};
pub use ports::{BatchOperation, Database, KeyValueStore};
pub use service::KvDatabase;
