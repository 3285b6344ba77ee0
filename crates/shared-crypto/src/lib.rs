//! # Shared Crypto - Primitives for the C2 Backend
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `symmetric` | XChaCha20-Poly1305 | Command/message protection, keys at rest |
//! | `hashing` | SHA3-256 | Shared-secret derivation |
//! | `signatures` | Ed25519 | Device identity keys (Public-Key mode) |
//! | `key_agreement` | X25519 | C2 long-term key pair, ECDH |
//! | `password` | Argon2id | KEK and password-derived device keys |
//!
//! ## Security Properties
//!
//! - **XChaCha20**: 192-bit random nonce, safe to generate per message
//! - **Protected payloads** carry a timestamp bound into the AEAD as associated data
//! - **Secret material** is wrapped in `Zeroizing` or zeroized on drop

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod key_agreement;
pub mod password;
pub mod signatures;
pub mod symmetric;

// Re-exports
pub use errors::CryptoError;
pub use hashing::sha3_256;
pub use key_agreement::{derive_shared_secret, X25519KeyPair};
pub use password::{derive_key_from_password, KdfParams, KeyEncryptionKey};
pub use signatures::{Ed25519KeyPair, Ed25519PublicKey};
pub use symmetric::{protect, protect_at, unprotect, unprotect_at, SecretKey};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
