//! Tracing subscriber setup for applications embedding docgate.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{GateError, Result};

/// Install a global subscriber. `RUST_LOG` takes precedence over
/// `config.level`.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| GateError::Config(format!("invalid log level {}: {}", config.level, e)))?;

    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().flatten_event(true))
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(false).with_thread_ids(true))
            .try_init(),
    };
    installed.map_err(|e| GateError::Config(format!("failed to install subscriber: {}", e)))?;

    tracing::info!(
        level = %config.level,
        format = ?config.format,
        version = env!("CARGO_PKG_VERSION"),
        "Tracing initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let config = LoggingConfig::default();
        // Another test may have installed a subscriber first; either way the
        // second call must fail.
        let _ = init_tracing(&config);
        assert!(init_tracing(&config).is_err());
    }
}
