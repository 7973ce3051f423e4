//! Tracing subscriber setup
//!
//! `RUST_LOG` takes precedence over the configured level so operators can
//! raise verbosity for a single component without editing configuration.

use crate::config::LoggingConfig;
use crate::utils::error::{GovernanceError, Result};
use tracing_subscriber::EnvFilter;

/// Build the env filter for the given logging configuration
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| {
        GovernanceError::config(format!("Invalid log level '{}': {}", config.level, e))
    })
}

/// Install the global tracing subscriber
///
/// Returns an error if a subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_thread_ids(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| {
        GovernanceError::internal(format!("Failed to install tracing subscriber: {}", e))
    })
}
