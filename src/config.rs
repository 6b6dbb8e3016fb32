//! Configuration Module
//!
//! Handles loading cache configuration from environment variables.

use std::env;

use tokio::time::Duration;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults suited to a session-scoped data cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Default TTL for entries without an explicit TTL
    pub default_ttl: Duration,
    /// Whether stale entries are served while refreshing in the background
    pub stale_while_revalidate: bool,
    /// Interval between background auto-refresh ticks
    pub refresh_interval: Duration,
    /// Interval between statistics snapshots
    pub snapshot_interval: Duration,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 100)
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CACHE_STALE_WHILE_REVALIDATE` - Serve stale while refreshing (default: false)
    /// - `CACHE_REFRESH_INTERVAL_MS` - Auto-refresh interval in milliseconds (default: 300000)
    /// - `CACHE_SNAPSHOT_INTERVAL_MS` - Stats snapshot interval in milliseconds (default: 60000)
    pub fn from_env() -> Self {
        Self {
            max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            default_ttl: env::var("CACHE_DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(Duration::from_secs(300)),
            stale_while_revalidate: env::var("CACHE_STALE_WHILE_REVALIDATE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            refresh_interval: env::var("CACHE_REFRESH_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(Duration::from_secs(300)),
            snapshot_interval: env::var("CACHE_SNAPSHOT_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(Duration::from_secs(60)),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 100,
            default_ttl: Duration::from_secs(300),
            stale_while_revalidate: false,
            refresh_interval: Duration::from_secs(300),
            snapshot_interval: Duration::from_secs(60),
        }
    }
}
