//! # C2-02 Key Protection
//!
//! Protects commands and topic messages for delivery to devices, in one of two
//! interchangeable modes, and manages the C2 server's own long-term key pair.
//!
//! ## Modes
//!
//! - **Symmetric**: every device shares a 32-byte secret with the server.
//! - **PubKey**: every device owns an Ed25519 identity. Commands are protected
//!   with a secret derived by X25519 between the C2 long-term key and the
//!   device's public key converted to Montgomery form.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - `E4Key`, `C2KeyRotationTx`, device-side helpers, errors
//! - `ports/` - `C2KeyStore` (durable staging for the C2 private key)
//! - `adapters/` - `FileKeyStore`, `InMemoryKeyStore`
//!
//! ## Usage
//!
//! ```ignore
//! use c2_02_key_protection::{E4Key, FileKeyStore};
//! use std::sync::Arc;
//!
//! let e4 = E4Key::pubkey(Arc::new(FileKeyStore::new("/var/lib/c2/c2.key")))?;
//!
//! let mut tx = e4.begin_c2_key_rotation()?;
//! distribute(tx.new_public_key())?;
//! tx.commit()?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{FileKeyStore, InMemoryKeyStore};
pub use domain::device::{unprotect_command_pubkey, unprotect_command_symmetric};
pub use domain::e4key::{E4Key, GeneratedKey, PubKeyState};
pub use domain::errors::{KeyError, KeyStoreError, RotationError};
pub use domain::rotation::{C2KeyRotationTx, RotationState};
pub use ports::outbound::{C2KeyStore, C2Secret};
