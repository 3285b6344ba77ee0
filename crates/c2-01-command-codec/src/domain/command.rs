//! # Commands
//!
//! The typed command model. Every field has its wire length in its type, so a
//! `Command` value is valid by construction and `to_bytes` cannot fail.

use shared_types::{
    ClientId, TopicHash, CURVE25519_KEY_LEN, ED25519_PRIVATE_KEY_LEN, ED25519_PUBLIC_KEY_LEN,
    HASH_LEN, ID_LEN, KEY_LEN,
};
use std::fmt;

/// Command tag, the first byte on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandKind {
    RemoveTopic = 0x00,
    ResetTopics = 0x01,
    SetIdKey = 0x02,
    SetTopicKey = 0x03,
    RemovePubKey = 0x04,
    ResetPubKeys = 0x05,
    SetPubKey = 0x06,
    SetC2Key = 0x07,
}

impl CommandKind {
    /// Every kind, in tag order.
    pub const ALL: [CommandKind; 8] = [
        CommandKind::RemoveTopic,
        CommandKind::ResetTopics,
        CommandKind::SetIdKey,
        CommandKind::SetTopicKey,
        CommandKind::RemovePubKey,
        CommandKind::ResetPubKeys,
        CommandKind::SetPubKey,
        CommandKind::SetC2Key,
    ];

    /// Wire tag.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Look up a kind by tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.tag() == tag)
    }

    /// Accepted payload lengths, excluding the tag byte.
    pub fn payload_lengths(self) -> &'static [usize] {
        match self {
            CommandKind::RemoveTopic => &[HASH_LEN],
            CommandKind::ResetTopics | CommandKind::ResetPubKeys => &[0],
            CommandKind::SetIdKey => &[KEY_LEN, ED25519_PRIVATE_KEY_LEN],
            CommandKind::SetTopicKey => &[KEY_LEN + HASH_LEN],
            CommandKind::RemovePubKey => &[ID_LEN],
            CommandKind::SetPubKey => &[ED25519_PUBLIC_KEY_LEN + ID_LEN],
            CommandKind::SetC2Key => &[CURVE25519_KEY_LEN],
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandKind::RemoveTopic => "RemoveTopic",
            CommandKind::ResetTopics => "ResetTopics",
            CommandKind::SetIdKey => "SetIdKey",
            CommandKind::SetTopicKey => "SetTopicKey",
            CommandKind::RemovePubKey => "RemovePubKey",
            CommandKind::ResetPubKeys => "ResetPubKeys",
            CommandKind::SetPubKey => "SetPubKey",
            CommandKind::SetC2Key => "SetC2Key",
        };
        f.write_str(name)
    }
}

/// Identity key handed to a device by `SetIdKey`.
///
/// Symmetric mode sends the raw 32-byte secret; Public-Key mode sends the
/// 64-byte Ed25519 private key (seed ‖ public key).
#[derive(Clone, PartialEq, Eq)]
pub enum IdentityKeyMaterial {
    Symmetric([u8; KEY_LEN]),
    Ed25519([u8; ED25519_PRIVATE_KEY_LEN]),
}

impl IdentityKeyMaterial {
    /// Raw bytes as sent on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IdentityKeyMaterial::Symmetric(k) => &k[..],
            IdentityKeyMaterial::Ed25519(k) => &k[..],
        }
    }
}

impl fmt::Debug for IdentityKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKeyMaterial::Symmetric(_) => f.write_str("Symmetric(..)"),
            IdentityKeyMaterial::Ed25519(_) => f.write_str("Ed25519(..)"),
        }
    }
}

/// A control command addressed to one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Drop the key of one topic.
    RemoveTopic { topic_hash: TopicHash },
    /// Drop every topic key.
    ResetTopics,
    /// Replace the device's own identity key.
    SetIdKey { key: IdentityKeyMaterial },
    /// Install or replace the key of one topic.
    SetTopicKey {
        key: [u8; KEY_LEN],
        topic_hash: TopicHash,
    },
    /// Forget the public key of a peer device.
    RemovePubKey { client_id: ClientId },
    /// Forget every peer public key.
    ResetPubKeys,
    /// Install the Ed25519 public key of a peer device.
    SetPubKey {
        public_key: [u8; ED25519_PUBLIC_KEY_LEN],
        client_id: ClientId,
    },
    /// Install the C2 server's Curve25519 public key.
    SetC2Key {
        public_key: [u8; CURVE25519_KEY_LEN],
    },
}

impl Command {
    /// Tag of this command.
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::RemoveTopic { .. } => CommandKind::RemoveTopic,
            Command::ResetTopics => CommandKind::ResetTopics,
            Command::SetIdKey { .. } => CommandKind::SetIdKey,
            Command::SetTopicKey { .. } => CommandKind::SetTopicKey,
            Command::RemovePubKey { .. } => CommandKind::RemovePubKey,
            Command::ResetPubKeys => CommandKind::ResetPubKeys,
            Command::SetPubKey { .. } => CommandKind::SetPubKey,
            Command::SetC2Key { .. } => CommandKind::SetC2Key,
        }
    }

    /// Topic hash carried by the command, if any.
    pub fn topic_hash(&self) -> Option<&TopicHash> {
        match self {
            Command::RemoveTopic { topic_hash } | Command::SetTopicKey { topic_hash, .. } => {
                Some(topic_hash)
            }
            _ => None,
        }
    }

    /// Key carried by the command, if any. Public keys count as keys.
    pub fn key(&self) -> Option<&[u8]> {
        match self {
            Command::SetIdKey { key } => Some(key.as_bytes()),
            Command::SetTopicKey { key, .. } => Some(&key[..]),
            Command::SetPubKey { public_key, .. } | Command::SetC2Key { public_key } => {
                Some(&public_key[..])
            }
            _ => None,
        }
    }

    /// Client id carried by the command, if any.
    pub fn client_id(&self) -> Option<&ClientId> {
        match self {
            Command::RemovePubKey { client_id } | Command::SetPubKey { client_id, .. } => {
                Some(client_id)
            }
            _ => None,
        }
    }

    /// Wire encoding: tag followed by the payload fields in order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + ED25519_PRIVATE_KEY_LEN);
        out.push(self.kind().tag());
        match self {
            Command::ResetTopics | Command::ResetPubKeys => {}
            Command::RemoveTopic { topic_hash } => out.extend_from_slice(topic_hash.as_bytes()),
            Command::SetIdKey { key } => out.extend_from_slice(key.as_bytes()),
            Command::SetTopicKey { key, topic_hash } => {
                out.extend_from_slice(key);
                out.extend_from_slice(topic_hash.as_bytes());
            }
            Command::RemovePubKey { client_id } => out.extend_from_slice(client_id.as_bytes()),
            Command::SetPubKey {
                public_key,
                client_id,
            } => {
                out.extend_from_slice(public_key);
                out.extend_from_slice(client_id.as_bytes());
            }
            Command::SetC2Key { public_key } => out.extend_from_slice(public_key),
        }
        out
    }
}
