//! Logging setup.
//!
//! Progress and diagnostics go to stderr through `tracing-subscriber`.
//! `RUST_LOG` overrides the level chosen on the command line.

use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

/// Install the global subscriber.
pub fn init_logging(default_level: Level) -> Result<(), CliError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| CliError::LoggingInit(e.to_string()))
}
