use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::LoggingConfig;
use crate::error::WalletError;

/// Builds the filter, with `RUST_LOG` taking precedence over the configured level.
fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, WalletError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| WalletError::Config(format!("invalid log level {}: {e}", config.level))),
    }
}

/// Installs the global tracing subscriber.
///
/// Fails with [`WalletError::Config`] if a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), WalletError> {
    let filter = build_filter(config)?;

    let result = if config.format == "json" {
        Registry::default()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        Registry::default()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init()
    };

    result.map_err(|e| WalletError::Config(format!("logging already initialized: {e}")))
}
