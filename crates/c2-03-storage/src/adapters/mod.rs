//! # Storage Adapters
//!
//! Enable the `rocksdb` feature for the production backend:
//!
//! ```toml
//! c2-03-storage = { path = "...", features = ["rocksdb"] }
//! ```

pub mod memory;

#[cfg(feature = "rocksdb")]
pub mod rocksdb;

pub use memory::InMemoryKVStore;

#[cfg(feature = "rocksdb")]
pub use self::rocksdb::{RocksDbConfig, RocksDbStore};
