//! Ports layer.

pub mod inbound;
pub mod outbound;

pub use inbound::C2Api;
pub use outbound::{Database, PubSubClient};
