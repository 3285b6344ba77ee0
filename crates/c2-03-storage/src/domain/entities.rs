//! # Stored Records
//!
//! Keys inside records are always ciphertext under the KEK. This crate never
//! sees plaintext key material.

use serde::{Deserialize, Serialize};
use shared_types::{ClientId, TopicHash};

/// A managed device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Derived from `name`.
    pub id: ClientId,
    /// Unique human label.
    pub name: String,
    /// Identity key (Symmetric) or Ed25519 public key (PubKey), encrypted.
    pub encrypted_key: Vec<u8>,
}

impl ClientRecord {
    /// Build a record, deriving the id from the name.
    pub fn new(name: impl Into<String>, encrypted_key: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            id: ClientId::from_name(&name),
            name,
            encrypted_key,
        }
    }
}

/// A broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
    /// Unique topic name.
    pub name: String,
    /// Derived from `name`.
    pub hash: TopicHash,
    /// Topic key, encrypted.
    pub encrypted_key: Vec<u8>,
}

impl TopicRecord {
    /// Build a record, deriving the hash from the name.
    pub fn new(name: impl Into<String>, encrypted_key: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            hash: TopicHash::from_name(&name),
            name,
            encrypted_key,
        }
    }
}
