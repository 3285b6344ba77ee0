//! # Device-Side Helpers
//!
//! What a device does with a protected command: derive the same secret the
//! server used and open the payload. Used by tooling and tests to stand in for
//! real firmware.

use crate::domain::errors::KeyError;
use shared_crypto::{derive_shared_secret, unprotect, Ed25519KeyPair};
use shared_types::CURVE25519_KEY_LEN;
use x25519_dalek::StaticSecret;

/// Open a command protected in Symmetric mode with the device's identity key.
pub fn unprotect_command_symmetric(
    protected: &[u8],
    client_key: &[u8],
) -> Result<Vec<u8>, KeyError> {
    Ok(unprotect(client_key, protected)?)
}

/// Open a command protected in Public-Key mode.
///
/// `device_private_key` is the 64-byte Ed25519 private key the device was
/// given; `c2_public_key` is the C2 Curve25519 public key it last received.
pub fn unprotect_command_pubkey(
    protected: &[u8],
    device_private_key: &[u8],
    c2_public_key: &[u8; CURVE25519_KEY_LEN],
) -> Result<Vec<u8>, KeyError> {
    let identity = Ed25519KeyPair::from_private_bytes(device_private_key)?;
    let scalar = StaticSecret::from(*identity.to_curve25519_secret());
    let secret = derive_shared_secret(&scalar, c2_public_key)?;
    Ok(unprotect(&secret[..], protected)?)
}
