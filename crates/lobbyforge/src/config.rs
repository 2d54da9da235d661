//! Layered service configuration.

use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use lobbyforge_engine::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::LobbyforgeError;

/// Default config file, looked up in the working directory.
pub const CONFIG_FILE: &str = "Lobbyforge.toml";

/// Prefix for environment overrides, e.g. `LOBBYFORGE_BIND_ADDR`.
pub const ENV_PREFIX: &str = "LOBBYFORGE_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Which lobby store backs the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Memory,
    /// Needs the `sqlite` feature.
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind_addr: String,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_level: String,
    pub log_format: LogFormat,
    pub request_timeout_ms: u64,
    pub actor_channel_size: usize,
    /// Idle time after which a lobby actor stops.
    pub actor_idle_timeout_ms: u64,
    pub store: StoreKind,
    pub database_url: String,
    /// Usernames registered at start-up, ids assigned in order.
    pub seed_users: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8081".into(),
            log_level: "info".into(),
            log_format: LogFormat::Pretty,
            request_timeout_ms: 10_000,
            actor_channel_size: 32,
            actor_idle_timeout_ms: 300_000,
            store: StoreKind::Memory,
            database_url: "sqlite://lobbyforge.db".into(),
            seed_users: Vec::new(),
        }
    }
}

impl Config {
    /// Load order:
    ///     1. Default values
    ///     2. Lobbyforge.toml (override)
    ///     3. `LOBBYFORGE_*` environment variables (override)
    pub fn load() -> Result<Self, LobbyforgeError> {
        Self::from_figment(Self::figment())
    }

    pub fn figment() -> Figment {
        Self::figment_from(CONFIG_FILE)
    }

    /// Same layering as [`figment`](Self::figment) with a different file.
    pub fn figment_from(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn from_figment(figment: Figment) -> Result<Self, LobbyforgeError> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), LobbyforgeError> {
        if self.request_timeout_ms == 0 {
            return Err(LobbyforgeError::InvalidConfig(
                "request_timeout_ms must be positive".into(),
            ));
        }
        if self.actor_channel_size == 0 {
            return Err(LobbyforgeError::InvalidConfig(
                "actor_channel_size must be positive".into(),
            ));
        }
        if self.actor_idle_timeout_ms == 0 {
            return Err(LobbyforgeError::InvalidConfig(
                "actor_idle_timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            actor_channel_size: self.actor_channel_size,
            actor_idle_timeout_ms: self.actor_idle_timeout_ms,
        }
    }
}
