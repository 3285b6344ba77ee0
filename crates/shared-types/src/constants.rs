//! # Protocol Constants
//!
//! Byte lengths and limits shared by the codec, the key-protection layer and
//! the storage records. Changing any of these breaks deployed devices.

/// Length of a client identifier.
pub const ID_LEN: usize = 16;

/// Length of a topic hash.
pub const HASH_LEN: usize = 16;

/// Length of a symmetric key (client identity key or topic key).
pub const KEY_LEN: usize = 32;

/// Length of an Ed25519 public key.
pub const ED25519_PUBLIC_KEY_LEN: usize = 32;

/// Length of an Ed25519 private key (seed followed by the public key).
pub const ED25519_PRIVATE_KEY_LEN: usize = 64;

/// Length of a Curve25519 key, public or private.
pub const CURVE25519_KEY_LEN: usize = 32;

/// Length of the timestamp prefix on protected payloads.
pub const TIMESTAMP_LEN: usize = 8;

/// Length of an XChaCha20 nonce.
pub const NONCE_LEN: usize = 24;

/// Length of a Poly1305 authentication tag.
pub const TAG_LEN: usize = 16;

/// Smallest valid protected payload: timestamp, nonce and tag over an empty plaintext.
pub const PROTECTED_OVERHEAD: usize = TIMESTAMP_LEN + NONCE_LEN + TAG_LEN;

/// Protected payloads older than this are rejected (seconds).
pub const MAX_PROTECTED_AGE_SECS: u64 = 600;

/// Tolerated clock skew for protected payloads stamped in the future (seconds).
pub const MAX_FUTURE_SKEW_SECS: u64 = 60;

/// Maximum length of a client or topic name in bytes.
pub const MAX_NAME_LEN: usize = 256;

/// Prefix of every client control channel.
pub const CONTROL_TOPIC_PREFIX: &str = "e4/";
