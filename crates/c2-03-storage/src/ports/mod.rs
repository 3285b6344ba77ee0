//! Ports layer.

pub mod inbound;
pub mod outbound;

pub use inbound::Database;
pub use outbound::{BatchOperation, KeyValueStore};
