//! Configuration Module
//!
//! Handles loading and managing configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{TierConfig, HOT_TIER, QUERY_TIER, SCHEMA_TIER};
use crate::error::{CacheError, Result};

/// Caching layer configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Capacity of the count-bounded `hot` tier
    pub hot_tier_capacity: usize,
    /// Validity window of the time-bounded `schema` tier, in seconds
    pub schema_tier_ttl: u64,
    /// Capacity of the hybrid `query` tier
    pub query_tier_capacity: usize,
    /// Validity window of the hybrid `query` tier, in seconds
    pub query_tier_ttl: u64,
    /// Interval between maintenance passes, in seconds
    pub maintenance_interval: u64,
    /// Configured size of the store connection pool
    pub pool_capacity: usize,
    /// Address of the backing store
    pub store_addr: String,
    /// Bound on a single store probe, in milliseconds
    pub probe_timeout_ms: u64,
    /// Create and probe the store client during startup
    pub warm_up_on_start: bool,
    /// Admin HTTP port
    pub admin_port: u16,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `HOT_TIER_CAPACITY` - Entries in the hot tier (default: 100)
    /// - `SCHEMA_TIER_TTL_SECS` - Schema tier TTL in seconds (default: 600)
    /// - `QUERY_TIER_CAPACITY` - Entries in the query tier (default: 1000)
    /// - `QUERY_TIER_TTL_SECS` - Query tier TTL in seconds (default: 300)
    /// - `MAINTENANCE_INTERVAL_SECS` - Maintenance frequency in seconds (default: 120)
    /// - `POOL_CAPACITY` - Store pool size (default: 10)
    /// - `STORE_ADDR` - Backing store address (default: 127.0.0.1:5432)
    /// - `PROBE_TIMEOUT_MS` - Health probe timeout (default: 5000)
    /// - `WARM_UP_ON_START` - Warm the store client at startup (default: true)
    /// - `ADMIN_PORT` - Admin HTTP port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            hot_tier_capacity: env_or("HOT_TIER_CAPACITY", defaults.hot_tier_capacity),
            schema_tier_ttl: env_or("SCHEMA_TIER_TTL_SECS", defaults.schema_tier_ttl),
            query_tier_capacity: env_or("QUERY_TIER_CAPACITY", defaults.query_tier_capacity),
            query_tier_ttl: env_or("QUERY_TIER_TTL_SECS", defaults.query_tier_ttl),
            maintenance_interval: env_or(
                "MAINTENANCE_INTERVAL_SECS",
                defaults.maintenance_interval,
            ),
            pool_capacity: env_or("POOL_CAPACITY", defaults.pool_capacity),
            store_addr: env::var("STORE_ADDR").unwrap_or(defaults.store_addr),
            probe_timeout_ms: env_or("PROBE_TIMEOUT_MS", defaults.probe_timeout_ms),
            warm_up_on_start: env_or("WARM_UP_ON_START", defaults.warm_up_on_start),
            admin_port: env_or("ADMIN_PORT", defaults.admin_port),
        }
    }

    /// Rejects values the caches and scheduler cannot work with.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            (self.hot_tier_capacity == 0, "HOT_TIER_CAPACITY"),
            (self.schema_tier_ttl == 0, "SCHEMA_TIER_TTL_SECS"),
            (self.query_tier_capacity == 0, "QUERY_TIER_CAPACITY"),
            (self.query_tier_ttl == 0, "QUERY_TIER_TTL_SECS"),
            (self.maintenance_interval == 0, "MAINTENANCE_INTERVAL_SECS"),
            (self.probe_timeout_ms == 0, "PROBE_TIMEOUT_MS"),
        ];

        match checks.iter().find(|(invalid, _)| *invalid) {
            Some((_, name)) => Err(CacheError::InvalidConfig(format!(
                "{} must be greater than zero",
                name
            ))),
            None => Ok(()),
        }
    }

    /// The three standard tiers: `hot`, `schema` and `query`.
    pub fn tier_configs(&self) -> Vec<TierConfig> {
        vec![
            TierConfig::bounded(HOT_TIER, self.hot_tier_capacity),
            TierConfig::expiring(SCHEMA_TIER, Duration::from_secs(self.schema_tier_ttl)),
            TierConfig::hybrid(
                QUERY_TIER,
                self.query_tier_capacity,
                Duration::from_secs(self.query_tier_ttl),
            ),
        ]
    }

    pub fn maintenance_interval(&self) -> Duration {
        Duration::from_secs(self.maintenance_interval)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hot_tier_capacity: 100,
            schema_tier_ttl: 600,
            query_tier_capacity: 1000,
            query_tier_ttl: 300,
            maintenance_interval: 120,
            pool_capacity: 10,
            store_addr: "127.0.0.1:5432".to_string(),
            probe_timeout_ms: 5000,
            warm_up_on_start: true,
            admin_port: 3000,
        }
    }
}
