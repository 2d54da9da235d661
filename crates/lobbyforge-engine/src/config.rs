//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a [`LobbyEngine`](crate::LobbyEngine).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Command queue depth of each lobby actor. Callers wait (rather than
    /// fail) when a lobby's queue is full.
    pub actor_channel_size: usize,

    /// How long a lobby actor waits for a command before it stops. The
    /// next command for that lobby spawns a fresh one.
    pub actor_idle_timeout_ms: u64,
}

impl EngineConfig {
    pub fn actor_idle_timeout(&self) -> Duration {
        Duration::from_millis(self.actor_idle_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            actor_channel_size: 32,
            actor_idle_timeout_ms: 300_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.actor_channel_size, 32);
        assert_eq!(config.actor_idle_timeout(), Duration::from_secs(300));
    }
}
