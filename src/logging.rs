//! Tracing subscriber setup

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(&config.level)))?;

    let builder = fmt().with_env_filter(filter).with_target(true);
    let installed = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.pretty().try_init()
    };

    installed.map_err(|e| anyhow::anyhow!("Failed to initialise logging: {e}"))
}

/// Configured level for this crate, `warn` for dependencies
fn default_directives(level: &str) -> String {
    format!("warn,zeus_pressure={level},tower_http={level}")
}
