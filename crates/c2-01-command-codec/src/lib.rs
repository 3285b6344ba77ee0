//! # C2-01 Command Codec
//!
//! Encodes and decodes the control commands the C2 server pushes to devices.
//! This crate is the single source of truth for the on-the-wire command shape;
//! deployed firmware decodes exactly these bytes.
//!
//! ## Wire Format
//!
//! The first byte is the tag, the rest is a fixed-shape payload:
//!
//! | Tag | Command | Payload |
//! |-----|---------|---------|
//! | 0x00 | `RemoveTopic` | topic hash (16) |
//! | 0x01 | `ResetTopics` | none |
//! | 0x02 | `SetIdKey` | key (32, or 64 for an Ed25519 private key) |
//! | 0x03 | `SetTopicKey` | key (32) ‖ topic hash (16) |
//! | 0x04 | `RemovePubKey` | client id (16) |
//! | 0x05 | `ResetPubKeys` | none |
//! | 0x06 | `SetPubKey` | Ed25519 public key (32) ‖ client id (16) |
//! | 0x07 | `SetC2Key` | Curve25519 public key (32) |
//!
//! ## Invariants
//!
//! - An unknown tag or a payload of the wrong length is a hard failure.
//!   Nothing is truncated or padded.
//! - A [`Command`] is immutable once built; every constructor validates.
//!
//! ## Crate Structure
//!
//! - `domain/` - `CommandKind`, `Command`, `CodecError`
//! - `codec/` - `encode` from raw fields, `decode` from bytes
//!
//! ## Usage
//!
//! ```ignore
//! use c2_01_command_codec::{decode, encode, CommandKind, RawFields};
//!
//! let bytes = encode(
//!     CommandKind::SetTopicKey,
//!     &RawFields::new().key(&topic_key).topic_hash(&hash),
//! )?;
//! let command = decode(&bytes)?;
//! assert_eq!(command.kind(), CommandKind::SetTopicKey);
//! ```

pub mod codec;
pub mod domain;

pub use codec::{decode, encode, RawFields};
pub use domain::command::{Command, CommandKind, IdentityKeyMaterial};
pub use domain::errors::CodecError;
