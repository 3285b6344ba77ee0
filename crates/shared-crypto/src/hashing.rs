//! # SHA3-256 Hashing
//!
//! The protocol hashes names into identifiers (see `shared-types`) and
//! Diffie-Hellman outputs into symmetric keys. Both use SHA3-256.

use sha3::{Digest, Sha3_256};

/// SHA3-256 output (256-bit).
pub type Hash = [u8; 32];

/// Hash data with SHA3-256 (one-shot).
pub fn sha3_256(data: &[u8]) -> Hash {
    let digest = Sha3_256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}
