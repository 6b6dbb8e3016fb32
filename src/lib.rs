//! swr-cache - An in-memory TTL cache with stale-while-revalidate fetching
//!
//! Provides a bounded key/value cache with lazy per-entry expiry, a fetch
//! coordinator that coalesces concurrent requests per key and can serve
//! stale values while refreshing in the background, and background tasks
//! for periodic auto-refresh and statistics snapshots.
//!
//! Expiry is lazy only: expired entries are reclaimed on the next access to
//! their key, a trade-off suited to bounded session caches rather than
//! long-lived server caches.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod tasks;

pub use cache::{CacheEntry, CacheStats, TtlCache};
pub use config::CacheConfig;
pub use error::{FetchError, Result};
pub use fetch::{CachedFetcher, FetchOptions};
pub use tasks::{
    spawn_refresh_task, spawn_snapshot_task, FileSnapshotStore, SnapshotStore, StatsSnapshot,
};
