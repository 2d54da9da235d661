//! Gateway client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where the RPC surface lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Absolute base URL, e.g. `http://127.0.0.1:8081`. A trailing slash is
    /// ignored.
    pub base_url: String,

    /// Upper bound on a whole request, connect to last body byte.
    pub request_timeout_ms: u64,
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8081".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_config_default() {
        let config = GatewayConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8081");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_with_request_timeout() {
        let config = GatewayConfig::new("http://lobbies.internal")
            .with_request_timeout(Duration::from_millis(250));
        assert_eq!(config.request_timeout_ms, 250);
        assert_eq!(config.base_url, "http://lobbies.internal");
    }
}
