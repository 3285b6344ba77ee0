//! Domain Layer - key-protection strategy and rotation
//!
//! RULES:
//! - No async code
//! - Persistence only through the `C2KeyStore` port

pub mod device;
pub mod e4key;
pub mod errors;
pub mod rotation;
