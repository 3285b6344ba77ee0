//! # E4 C2 Backend
//!
//! Entry point. See the `c2_runtime` library for configuration and wiring.
//!
//! Broker bridges live outside this workspace; the binary runs against the
//! in-process broker so the engine can be exercised end to end.

use std::sync::Arc;

use anyhow::{Context, Result};
use c2_runtime::logging::init_tracing;
use c2_runtime::{C2Runtime, RuntimeConfig};
use shared_bus::InMemoryBroker;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env().context("Failed to load configuration")?;
    init_tracing(&config)?;

    if let Err(e) = config.validate_for_production() {
        warn!(error = %e, "Configuration is not production-ready");
    }

    let broker = InMemoryBroker::new();
    let transport = Arc::new(broker.client("e4-c2"));

    let runtime = C2Runtime::new(&config, transport).context("Failed to wire C2 service")?;
    runtime.start().await?;

    info!("C2 backend is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
