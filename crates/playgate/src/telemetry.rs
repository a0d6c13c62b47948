//! Logging setup.

use tracing_subscriber::{EnvFilter, fmt};

/// Installs a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// # Errors
/// [`PlaygateError::Telemetry`](crate::PlaygateError::Telemetry) if a
/// global subscriber is already set.
pub fn init_tracing() -> Result<(), crate::PlaygateError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| crate::PlaygateError::Telemetry(e.to_string()))
}
