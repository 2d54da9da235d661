//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

use crate::{Config, LobbyforgeError, LogFormat};

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `config.log_level`. Fails if a subscriber is
/// already installed or the directive does not parse.
pub fn init(config: &Config) -> Result<(), LobbyforgeError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| LobbyforgeError::Logging(e.to_string()))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match config.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| LobbyforgeError::Logging(e.to_string()))
}
