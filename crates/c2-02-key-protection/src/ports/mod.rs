//! Ports layer.

pub mod outbound;

pub use outbound::{C2KeyStore, C2Secret};
