//! Tracing subscriber setup.

use crate::config::RuntimeConfig;
use crate::RuntimeError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// The filter is `config.log_level`, which already folds in `RUST_LOG`.
/// JSON lines when `config.json_logs` is set.
pub fn init_tracing(config: &RuntimeConfig) -> Result<(), RuntimeError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| RuntimeError::Logging(e.to_string()))?;

    if config.json_logs {
        // JSON output for containers/production
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| RuntimeError::Logging(e.to_string()))?;
    } else {
        // Pretty output for development
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| RuntimeError::Logging(e.to_string()))?;
    }

    Ok(())
}
