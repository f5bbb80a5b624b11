//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub cache_capacity: usize,
    /// Address the TCP listener binds to
    pub server_addr: String,
    /// Expiry sweep interval in seconds, 0 disables the sweeper
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `SERVER_ADDR` - Listen address (default: 0.0.0.0:8080)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 0, disabled)
    ///
    /// Unparsable numbers fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            cache_capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cache_capacity),
            server_addr: env::var("SERVER_ADDR").unwrap_or(defaults.server_addr),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Checks the values that would otherwise fail later at startup.
    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(Error::Config(
                "CACHE_CAPACITY must be greater than zero".to_string(),
            ));
        }
        self.socket_addr()?;
        Ok(())
    }

    /// Parsed listen address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.server_addr
            .parse()
            .map_err(|e| Error::Config(format!("SERVER_ADDR '{}': {}", self.server_addr, e)))
    }

    /// Sweep interval, or None when the sweeper is disabled.
    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.cleanup_interval > 0).then(|| Duration::from_secs(self.cleanup_interval))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_capacity: 1000,
            server_addr: "0.0.0.0:8080".to_string(),
            cleanup_interval: 0,
        }
    }
}
