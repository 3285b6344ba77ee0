//! # Core Identifiers
//!
//! - **Clients**: `ClientId`, derived from the client's human-chosen name
//! - **Topics**: `TopicHash`, the compact identifier used on the wire
//! - **Routing**: `control_topic`, the private channel of one client

use crate::constants::{CONTROL_TOPIC_PREFIX, HASH_LEN, ID_LEN, MAX_NAME_LEN};
use crate::errors::IdentifierError;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// CLIENT IDENTIFIERS
// =============================================================================

/// Stable external identifier of a client.
///
/// Derived as the first `ID_LEN` bytes of SHA3-256 over the client name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(pub [u8; ID_LEN]);

impl ClientId {
    /// Derive the identifier of the client called `name`.
    pub fn from_name(name: &str) -> Self {
        Self(truncated_sha3(name.as_bytes()))
    }

    /// Build an identifier from raw bytes, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdentifierError> {
        let arr: [u8; ID_LEN] = bytes
            .try_into()
            .map_err(|_| IdentifierError::InvalidLength {
                kind: "client id",
                expected: ID_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    /// Private control channel of this client.
    pub fn control_topic(&self) -> String {
        control_topic(self)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for ClientId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| IdentifierError::InvalidHex {
            kind: "client id",
            reason: e.to_string(),
        })?;
        Self::from_slice(&bytes)
    }
}

// =============================================================================
// TOPIC IDENTIFIERS
// =============================================================================

/// Fixed-length digest of a topic name, used wherever the name itself is too
/// long for the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TopicHash(pub [u8; HASH_LEN]);

impl TopicHash {
    /// Hash the topic called `name`.
    pub fn from_name(name: &str) -> Self {
        Self(truncated_sha3(name.as_bytes()))
    }

    /// Build a topic hash from raw bytes, checking the length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, IdentifierError> {
        let arr: [u8; HASH_LEN] = bytes
            .try_into()
            .map_err(|_| IdentifierError::InvalidLength {
                kind: "topic hash",
                expected: HASH_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }
}

impl fmt::Display for TopicHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Topic a client listens on for control commands: `e4/<hex id>`.
pub fn control_topic(id: &ClientId) -> String {
    format!("{}{}", CONTROL_TOPIC_PREFIX, id)
}

/// Check that a client or topic name is non-empty and at most `MAX_NAME_LEN` bytes.
pub fn validate_name(kind: &'static str, name: &str) -> Result<(), IdentifierError> {
    if name.is_empty() {
        return Err(IdentifierError::InvalidName {
            kind,
            reason: "name is empty".to_string(),
        });
    }
    if name.len() > MAX_NAME_LEN {
        return Err(IdentifierError::InvalidName {
            kind,
            reason: format!("name is {} bytes, limit is {}", name.len(), MAX_NAME_LEN),
        });
    }
    Ok(())
}

fn truncated_sha3<const N: usize>(data: &[u8]) -> [u8; N] {
    let digest = Sha3_256::digest(data);
    let mut out = [0u8; N];
    out.copy_from_slice(&digest[..N]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_id_is_deterministic() {
        assert_eq!(ClientId::from_name("c1"), ClientId::from_name("c1"));
        assert_ne!(ClientId::from_name("c1"), ClientId::from_name("c2"));
    }

    #[test]
    fn test_client_id_matches_truncated_sha3() {
        let digest = Sha3_256::digest(b"device-42");
        let id = ClientId::from_name("device-42");
        assert_eq!(&id.0[..], &digest[..ID_LEN]);
    }

    #[test]
    fn test_client_id_hex_roundtrip() {
        let id = ClientId::from_name("sensor");
        let parsed: ClientId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_client_id_rejects_wrong_length() {
        let err = ClientId::from_slice(&[0u8; 15]).unwrap_err();
        assert_eq!(
            err,
            IdentifierError::InvalidLength {
                kind: "client id",
                expected: ID_LEN,
                actual: 15
            }
        );
        assert!("zz".parse::<ClientId>().is_err());
    }

    #[test]
    fn test_topic_hash_length() {
        let hash = TopicHash::from_name("t1");
        assert_eq!(hash.as_bytes().len(), HASH_LEN);
        assert!(TopicHash::from_slice(&[1u8; HASH_LEN + 1]).is_err());
    }

    #[test]
    fn test_control_topic_format() {
        let id = ClientId([0xAB; ID_LEN]);
        assert_eq!(control_topic(&id), format!("e4/{}", "ab".repeat(ID_LEN)));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("client", "c1").is_ok());
        assert!(validate_name("client", "").is_err());
        assert!(validate_name("topic", &"x".repeat(MAX_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_identifiers_serialize_with_bincode() {
        let id = ClientId::from_name("c1");
        let bytes = bincode::serialize(&id).unwrap();
        let back: ClientId = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, id);
    }
}
