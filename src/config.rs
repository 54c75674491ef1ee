//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Number of expired keys removed per write-lock acquisition during a sweep
    pub sweep_chunk_size: usize,
    /// TTL in seconds applied by callers to guild read models
    pub guild_ttl: u64,
    /// TTL in seconds applied by callers to user read models
    pub user_ttl: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    /// - `SWEEP_CHUNK_SIZE` - Keys removed per lock acquisition (default: 1024)
    /// - `GUILD_TTL` - Guild read model TTL in seconds (default: 300)
    /// - `USER_TTL` - User read model TTL in seconds (default: 600)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            sweep_chunk_size: env_or("SWEEP_CHUNK_SIZE", defaults.sweep_chunk_size),
            guild_ttl: env_or("GUILD_TTL", defaults.guild_ttl),
            user_ttl: env_or("USER_TTL", defaults.user_ttl),
        }
    }

    /// Rejects values the scheduler cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.cleanup_interval == 0 {
            return Err(CacheError::InvalidConfig(
                "CLEANUP_INTERVAL must be at least 1 second".to_string(),
            ));
        }
        if self.sweep_chunk_size == 0 {
            return Err(CacheError::InvalidConfig(
                "SWEEP_CHUNK_SIZE must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cleanup_period(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval)
    }

    pub fn guild_ttl(&self) -> Duration {
        Duration::from_secs(self.guild_ttl)
    }

    pub fn user_ttl(&self) -> Duration {
        Duration::from_secs(self.user_ttl)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cleanup_interval: 60,
            sweep_chunk_size: 1024,
            guild_ttl: 300,
            user_ttl: 600,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cleanup_interval, 60);
        assert_eq!(config.sweep_chunk_size, 1024);
        assert_eq!(config.guild_ttl, 300);
        assert_eq!(config.user_ttl, 600);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CLEANUP_INTERVAL");
        env::remove_var("SWEEP_CHUNK_SIZE");
        env::remove_var("GUILD_TTL");
        env::remove_var("USER_TTL");

        let config = Config::from_env();
        assert_eq!(config.cleanup_interval, 60);
        assert_eq!(config.sweep_chunk_size, 1024);
        assert_eq!(config.guild_ttl, 300);
        assert_eq!(config.user_ttl, 600);
    }

    #[test]
    fn test_config_durations() {
        let config = Config::default();
        assert_eq!(config.cleanup_period(), Duration::from_secs(60));
        assert_eq!(config.guild_ttl(), Duration::from_secs(300));
        assert_eq!(config.user_ttl(), Duration::from_secs(600));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = Config {
            cleanup_interval: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let config = Config {
            sweep_chunk_size: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));
    }
}
