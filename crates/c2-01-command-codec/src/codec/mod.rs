//! # Encode / Decode
//!
//! `encode` is the validating entry point for callers holding raw byte slices
//! (RPC adapters, tooling). It checks presence, absence and exact length of
//! every field before producing any bytes. `decode` is its inverse.

use crate::domain::command::{Command, CommandKind, IdentityKeyMaterial};
use crate::domain::errors::CodecError;
use shared_types::{
    ClientId, TopicHash, CURVE25519_KEY_LEN, ED25519_PRIVATE_KEY_LEN, ED25519_PUBLIC_KEY_LEN,
    HASH_LEN, ID_LEN, KEY_LEN,
};


const FIELD_TOPIC_HASH: &str = "topic_hash";
const FIELD_KEY: &str = "key";
const FIELD_CLIENT_ID: &str = "client_id";

/// Untyped command fields as supplied by a caller.
///
/// Absent fields are `None`. No normalization happens: an empty slice is a
/// present field of length zero, not an absent one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawFields<'a> {
    pub topic_hash: Option<&'a [u8]>,
    pub key: Option<&'a [u8]>,
    pub client_id: Option<&'a [u8]>,
}

impl<'a> RawFields<'a> {
    /// No fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the topic hash.
    pub fn topic_hash(mut self, value: &'a [u8]) -> Self {
        self.topic_hash = Some(value);
        self
    }

    /// Set the key.
    pub fn key(mut self, value: &'a [u8]) -> Self {
        self.key = Some(value);
        self
    }

    /// Set the client id.
    pub fn client_id(mut self, value: &'a [u8]) -> Self {
        self.client_id = Some(value);
        self
    }
}

impl Command {
    /// Build a command of `kind` from raw fields, validating every field.
    ///
    /// # Errors
    ///
    /// `CodecError::InvalidArgument` naming the first offending field.
    pub fn from_fields(kind: CommandKind, fields: &RawFields<'_>) -> Result<Self, CodecError> {
        let command = match kind {
            CommandKind::RemoveTopic => {
                forbid(kind, FIELD_KEY, fields.key)?;
                forbid(kind, FIELD_CLIENT_ID, fields.client_id)?;
                Command::RemoveTopic {
                    topic_hash: TopicHash(fixed::<HASH_LEN>(FIELD_TOPIC_HASH, fields.topic_hash)?),
                }
            }
            CommandKind::ResetTopics | CommandKind::ResetPubKeys => {
                forbid(kind, FIELD_TOPIC_HASH, fields.topic_hash)?;
                forbid(kind, FIELD_KEY, fields.key)?;
                forbid(kind, FIELD_CLIENT_ID, fields.client_id)?;
                if kind == CommandKind::ResetTopics {
                    Command::ResetTopics
                } else {
                    Command::ResetPubKeys
                }
            }
            CommandKind::SetIdKey => {
                forbid(kind, FIELD_TOPIC_HASH, fields.topic_hash)?;
                forbid(kind, FIELD_CLIENT_ID, fields.client_id)?;
                let key = require(FIELD_KEY, fields.key)?;
                Command::SetIdKey {
                    key: identity_key(FIELD_KEY, key)?,
                }
            }
            CommandKind::SetTopicKey => {
                forbid(kind, FIELD_CLIENT_ID, fields.client_id)?;
                Command::SetTopicKey {
                    key: fixed::<KEY_LEN>(FIELD_KEY, fields.key)?,
                    topic_hash: TopicHash(fixed::<HASH_LEN>(FIELD_TOPIC_HASH, fields.topic_hash)?),
                }
            }
            CommandKind::RemovePubKey => {
                forbid(kind, FIELD_TOPIC_HASH, fields.topic_hash)?;
                forbid(kind, FIELD_KEY, fields.key)?;
                Command::RemovePubKey {
                    client_id: ClientId(fixed::<ID_LEN>(FIELD_CLIENT_ID, fields.client_id)?),
                }
            }
            CommandKind::SetPubKey => {
                forbid(kind, FIELD_TOPIC_HASH, fields.topic_hash)?;
                Command::SetPubKey {
                    public_key: fixed::<ED25519_PUBLIC_KEY_LEN>(FIELD_KEY, fields.key)?,
                    client_id: ClientId(fixed::<ID_LEN>(FIELD_CLIENT_ID, fields.client_id)?),
                }
            }
            CommandKind::SetC2Key => {
                forbid(kind, FIELD_TOPIC_HASH, fields.topic_hash)?;
                forbid(kind, FIELD_CLIENT_ID, fields.client_id)?;
                Command::SetC2Key {
                    public_key: fixed::<CURVE25519_KEY_LEN>(FIELD_KEY, fields.key)?,
                }
            }
        };
        Ok(command)
    }
}

/// Encode a command of `kind` from raw fields.
///
/// # Errors
///
/// `CodecError::InvalidArgument` on a missing, unexpected or wrong-length field.
pub fn encode(kind: CommandKind, fields: &RawFields<'_>) -> Result<Vec<u8>, CodecError> {
    Command::from_fields(kind, fields).map(|c| c.to_bytes())
}

/// Decode a command from its wire bytes.
///
/// # Errors
///
/// - `CodecError::Empty` for an empty buffer
/// - `CodecError::UnknownVariant` for an unknown tag
/// - `CodecError::TruncatedPayload` when the payload length does not match
pub fn decode(bytes: &[u8]) -> Result<Command, CodecError> {
    let (&tag, payload) = bytes.split_first().ok_or(CodecError::Empty)?;
    let kind = CommandKind::from_tag(tag).ok_or(CodecError::UnknownVariant(tag))?;

    let lengths = kind.payload_lengths();
    if !lengths.contains(&payload.len()) {
        // Report the closest accepted shape.
        let expected = lengths
            .iter()
            .copied()
            .min_by_key(|len| len.abs_diff(payload.len()))
            .unwrap_or(0);
        return Err(CodecError::TruncatedPayload {
            kind,
            expected,
            actual: payload.len(),
        });
    }

    let fields = match kind {
        CommandKind::RemoveTopic => RawFields::new().topic_hash(payload),
        CommandKind::ResetTopics | CommandKind::ResetPubKeys => RawFields::new(),
        CommandKind::SetIdKey | CommandKind::SetC2Key => RawFields::new().key(payload),
        CommandKind::SetTopicKey => {
            let (key, hash) = payload.split_at(KEY_LEN);
            RawFields::new().key(key).topic_hash(hash)
        }
        CommandKind::RemovePubKey => RawFields::new().client_id(payload),
        CommandKind::SetPubKey => {
            let (key, id) = payload.split_at(ED25519_PUBLIC_KEY_LEN);
            RawFields::new().key(key).client_id(id)
        }
    };
    Command::from_fields(kind, &fields)
}

fn require<'a>(field: &'static str, value: Option<&'a [u8]>) -> Result<&'a [u8], CodecError> {
    value.ok_or_else(|| CodecError::missing(field))
}

fn forbid(kind: CommandKind, field: &'static str, value: Option<&[u8]>) -> Result<(), CodecError> {
    match value {
        Some(_) => Err(CodecError::unexpected(field, kind)),
        None => Ok(()),
    }
}

fn fixed<const N: usize>(field: &'static str, value: Option<&[u8]>) -> Result<[u8; N], CodecError> {
    let bytes = require(field, value)?;
    bytes
        .try_into()
        .map_err(|_| CodecError::wrong_length(field, &N.to_string(), bytes.len()))
}

fn identity_key(field: &'static str, bytes: &[u8]) -> Result<IdentityKeyMaterial, CodecError> {
    if let Ok(key) = <[u8; KEY_LEN]>::try_from(bytes) {
        return Ok(IdentityKeyMaterial::Symmetric(key));
    }
    if let Ok(key) = <[u8; ED25519_PRIVATE_KEY_LEN]>::try_from(bytes) {
        return Ok(IdentityKeyMaterial::Ed25519(key));
    }
    Err(CodecError::wrong_length(
        field,
        &format!("{} or {}", KEY_LEN, ED25519_PRIVATE_KEY_LEN),
        bytes.len(),
    ))
}
