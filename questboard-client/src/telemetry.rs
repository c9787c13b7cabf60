//! Logging setup.
//!
//! Filter directives come from `QUESTBOARD_LOG`, then `RUST_LOG`, then the
//! built-in default.

use crate::config::LogConfig;
use crate::error::ClientError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "questboard_client=info,questboard=info,warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("QUESTBOARD_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Install the global subscriber. Call once, before any resource is activated.
pub fn init_logging(config: &LogConfig) -> Result<(), ClientError> {
    let registry = tracing_subscriber::registry().with(env_filter());
    let result = if config.json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };
    result.map_err(|e| ClientError::Logging(e.to_string()))?;

    tracing::info!(json = config.json, "Logging initialized");
    Ok(())
}
