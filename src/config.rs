//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Expiry sweeper interval in seconds
    pub cleanup_interval: u64,
    /// Lifetime in seconds of each pushed queue item
    pub queue_item_ttl: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 10)
    /// - `QUEUE_ITEM_TTL` - Queue item lifetime in seconds (default: 86400)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.cleanup_interval),
            queue_item_ttl: env::var("QUEUE_ITEM_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.queue_item_ttl),
        }
    }

    /// Sweeper interval as a `Duration`.
    pub fn cleanup_period(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval)
    }

    /// Queue item horizon as a `Duration`.
    pub fn queue_item_lifetime(&self) -> Duration {
        Duration::from_secs(self.queue_item_ttl)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            cleanup_interval: 10,
            queue_item_ttl: 24 * 60 * 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.cleanup_interval, 10);
        assert_eq!(config.queue_item_ttl, 86_400);
        assert_eq!(config.queue_item_lifetime(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("SERVER_PORT");
        env::remove_var("CLEANUP_INTERVAL");
        env::remove_var("QUEUE_ITEM_TTL");

        let config = Config::from_env();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.cleanup_period(), Duration::from_secs(10));
        assert_eq!(config.queue_item_ttl, 86_400);
    }
}
