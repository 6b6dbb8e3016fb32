//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use tokio::time::{Duration, Instant};

// == Cache Entry ==
/// A single cache entry: the stored data plus its timestamp and TTL.
///
/// Entries are replaced wholesale on `set`, never mutated in place.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The stored data
    pub data: T,
    /// When the entry was stored
    pub stored_at: Instant,
    /// Time-to-live for this entry
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new cache entry stored at the current instant.
    ///
    /// # Arguments
    /// * `data` - The data to store
    /// * `ttl` - Time-to-live for the entry
    pub fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            stored_at: Instant::now(),
            ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is fresh while `elapsed <= ttl` and
    /// expired strictly after the TTL has elapsed. An entry stored with a
    /// 1000ms TTL is still fresh at exactly 1000ms and expired at 1001ms.
    pub fn is_expired(&self) -> bool {
        self.stored_at.elapsed() > self.ttl
    }

    // == Age ==
    /// Returns how long ago the entry was stored.
    pub fn age(&self) -> Duration {
        self.stored_at.elapsed()
    }

    // == Time To Live ==
    /// Returns remaining TTL, saturating at zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.ttl.saturating_sub(self.age())
    }
}
