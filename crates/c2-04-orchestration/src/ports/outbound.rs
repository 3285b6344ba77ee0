//! # Outbound Ports (Driven Ports)
//!
//! The service owns no port definitions of its own; it is driven by the
//! storage and transport ports of its collaborators.
//!
//! | Port | Crate | Production | Testing |
//! |------|-------|------------|---------|
//! | `Database` | c2-03-storage | `KvDatabase<RocksDbStore>` | `KvDatabase<InMemoryKVStore>` |
//! | `PubSubClient` | shared-bus | broker bridge | `RecordingPubSubClient` |

pub use c2_03_storage::Database;
pub use shared_bus::PubSubClient;
