//! Domain Layer - records, key layout, errors
//!
//! RULES:
//! - No I/O operations
//! - No crypto: keys arrive already encrypted

pub mod entities;
pub mod errors;
pub mod keys;

pub use entities::{ClientRecord, TopicRecord};
pub use errors::{DbError, KVStoreError};
pub use keys::KeyPrefix;
