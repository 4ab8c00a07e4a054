//! Logging setup
//!
//! Engine events go to stderr so formatted reports on stdout stay
//! machine-readable.

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::RunConfig;

/// Level selected by `--verbose` or the configured `log_level`.
///
/// `--verbose` always means debug. Unrecognised names yield `None`.
pub fn select_level(config: &RunConfig, verbose: bool) -> Option<Level> {
    if verbose {
        return Some(Level::DEBUG);
    }
    match config.log_level.to_lowercase().as_str() {
        "warning" => Some(Level::WARN),
        name => name.parse().ok(),
    }
}

/// Directive admitting only the engine's own events at `level`
pub fn engine_directive(level: Level) -> String {
    format!("nestspec={}", level.as_str().to_lowercase())
}

/// Install the global subscriber for `config`, falling back to info
pub fn init_logger(config: &RunConfig, verbose: bool) -> Result<Level> {
    let level = select_level(config, verbose).unwrap_or(Level::INFO);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(engine_directive(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!("Failed to initialize logger: {err}"))?;
    Ok(level)
}
