//! Adapters for the [`C2KeyStore`](crate::ports::outbound::C2KeyStore) port.

pub mod file;
pub mod memory;

pub use file::FileKeyStore;
pub use memory::InMemoryKeyStore;
