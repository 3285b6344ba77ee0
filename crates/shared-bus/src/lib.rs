//! # Shared Bus - Publish/Subscribe Transport
//!
//! The transport collaborator of the C2 backend. The orchestration service
//! only ever talks to the [`PubSubClient`] port; concrete bridges (MQTT,
//! Kafka, cloud IoT) implement it outside this workspace.
//!
//! ```text
//! ┌──────────────┐   publish(payload, "e4/<id>", ExactlyOnce)   ┌──────────┐
//! │  E4Service   │ ───────────────────────────────────────────→ │  Broker  │
//! │              │   subscribe("<topic>")                       │          │
//! └──────────────┘ ───────────────────────────────────────────→ └──────────┘
//!                                                                     │
//!                                                      Subscription   ↓
//!                                                              ┌──────────┐
//!                                                              │  Device  │
//!                                                              └──────────┘
//! ```
//!
//! ## Delivery Contract
//!
//! - Client-directed control commands use [`QoS::ExactlyOnce`]; silent loss is
//!   not acceptable because key state depends on them.
//! - Topic broadcast messages may use [`QoS::AtMostOnce`].

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod client;
pub mod message;
pub mod recording;
pub mod subscriber;

// Re-export main types
pub use client::{InMemoryBroker, InMemoryPubSubClient, PubSubClient, TransportError};
pub use message::{QoS, TopicFilter, TransportMessage};
pub use recording::RecordingPubSubClient;
pub use subscriber::{MessageStream, Subscription, SubscriptionError};

/// Maximum messages to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
