//! Logging setup
//!
//! Installs the global `tracing` subscriber. Library code only emits events;
//! binaries call [`init_logging`] once at startup.

use crate::config::{LogFormat, LoggingConfig};
use crate::utils::error::{AuthzError, Result};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level when it is set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| AuthzError::config(format!("Invalid log level '{}': {}", config.level, e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_thread_ids(false);

    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    installed.map_err(|e| AuthzError::config(format!("Logging already initialized: {}", e)))
}
