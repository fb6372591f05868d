//! Tracing subscriber installation.

use crate::config::TelemetryConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors returned while installing the subscriber.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TelemetryError {
    /// The filter directive did not parse.
    #[error("invalid log filter '{filter}': {reason}")]
    InvalidFilter {
        /// Directive as configured.
        filter: String,
        /// Parser message.
        reason: String,
    },

    /// A global subscriber is already installed.
    #[error("tracing subscriber already installed: {0}")]
    AlreadyInstalled(String),
}

/// Installs a formatted subscriber filtered by `RUST_LOG`, falling back to
/// the configured directive.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] for a malformed directive and
/// [`TelemetryError::AlreadyInstalled`] when called twice.
pub fn init_tracing(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = resolve_filter(rust_log.as_deref(), &config.filter)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|err| TelemetryError::AlreadyInstalled(err.to_string()))
}

/// Picks `RUST_LOG` when it parses, the configured directive otherwise.
fn resolve_filter(rust_log: Option<&str>, configured: &str) -> Result<EnvFilter, TelemetryError> {
    rust_log
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .map_or_else(
            || {
                EnvFilter::try_new(configured).map_err(|err| TelemetryError::InvalidFilter {
                    filter: configured.to_owned(),
                    reason: err.to_string(),
                })
            },
            Ok,
        )
}
