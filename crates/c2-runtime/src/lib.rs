//! # E4 C2 Runtime
//!
//! Startup, wiring and shutdown of the C2 backend.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Install the tracing subscriber
//! 3. Derive the KEK, build the `E4Key`, open storage
//! 4. Connect the transport
//! 5. Re-subscribe to every stored topic
//! 6. Signal ready
//!
//! ## Modules
//!
//! - `config` - `RuntimeConfig` and production checks
//! - `logging` - tracing subscriber
//! - `wiring` - builds the `E4Service`

pub mod config;
pub mod logging;
pub mod wiring;

use c2_02_key_protection::KeyError;
use c2_03_storage::KVStoreError;
use c2_04_orchestration::{C2Api, PubSubClient, ServiceError};
use shared_bus::TransportError;
use shared_crypto::CryptoError;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

pub use config::{ConfigError, CryptoMode, RuntimeConfig};
pub use wiring::{build_service, C2Service, C2Store};

/// Startup and shutdown failures.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to install tracing subscriber: {0}")]
    Logging(String),

    #[error("KEK derivation failed: {0}")]
    Kek(#[from] CryptoError),

    #[error("C2 key setup failed: {0}")]
    Key(#[from] KeyError),

    #[error("Storage setup failed: {0}")]
    Storage(#[from] KVStoreError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// The running C2 backend.
pub struct C2Runtime<T: PubSubClient> {
    service: Arc<C2Service<T>>,
    transport: Arc<T>,
}

impl<T: PubSubClient> C2Runtime<T> {
    /// Wire the service. Nothing touches the network yet.
    pub fn new(config: &RuntimeConfig, transport: Arc<T>) -> Result<Self, RuntimeError> {
        info!(mode = %config.crypto_mode, "Creating E4 C2 runtime");
        let service = Arc::new(build_service(config, transport.clone())?);
        Ok(Self { service, transport })
    }

    /// Connect the transport and restore topic subscriptions.
    pub async fn start(&self) -> Result<(), RuntimeError> {
        self.transport.connect().await?;
        let topics = self.service.subscribe_all_topics().await?;
        info!(topics, "E4 C2 runtime started");
        Ok(())
    }

    /// Disconnect the transport.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        if let Err(e) = self.transport.disconnect().await {
            error!(error = %e, "Failed to disconnect transport");
        }
        info!("Shutdown complete");
    }

    /// The wired service, for front ends.
    pub fn service(&self) -> Arc<C2Service<T>> {
        Arc::clone(&self.service)
    }
}
