//! # C2 Orchestration (c2-04)
//!
//! The E4 command-and-control engine. Operators register clients and topics;
//! the engine pushes protected control commands to devices and keeps the
//! record of which client holds which topic key.
//!
//! ## Flow
//!
//! ```text
//! operator ──→ C2Api ──→ E4Service ──┬──→ Database      (c2-03)
//!                                    ├──→ E4Key         (c2-02)
//!                                    ├──→ Command codec (c2-01)
//!                                    └──→ PubSubClient  (shared-bus) ──→ e4/<client id>
//! ```
//!
//! ## Ordering Guarantee
//!
//! | Operation | Publish | Then persist |
//! |-----------|---------|--------------|
//! | `new_topic_client` | `SetTopicKey` | link edge |
//! | `remove_topic_client` | `RemoveTopic` | unlink edge |
//! | `new_client_key` | `SetIdKey` (under the old key) | store new key |
//! | `new_topic_key` | `SetTopicKey` to every member | store new key |
//! | `new_c2_key` | `SetC2Key` to every client | commit rotation |
//!
//! A failed publish returns the transport error and nothing is persisted.
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - `ServiceError`, read models
//! - `ports/` - `C2Api` (inbound); `Database`, `PubSubClient` (outbound)
//! - `service/` - `E4Service`

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{ClientSummary, ServiceError};
pub use ports::{C2Api, Database, PubSubClient};
pub use service::{E4Service, ServiceDependencies, LISTING_BATCH};
