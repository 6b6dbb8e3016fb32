//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with insertion-order eviction
//! and lazy TTL expiration. Expired entries are reclaimed on the next read of
//! their key; there is no background sweep. That trade-off suits a bounded,
//! session-scoped cache; a long-lived server cache would need an active
//! sweep or a true access-order LRU instead.

use std::collections::HashMap;

use tokio::time::Duration;

use crate::cache::{CacheEntry, CacheStats, InsertionOrder};

// == Lookup Result ==
/// Three-state read used by the fetch layer.
///
/// Unlike `get`, a stale lookup leaves the entry in place: the fetch layer
/// still needs the stale value for stale-while-revalidate and for falling
/// back when a refresh fails.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Lookup<T> {
    /// No entry for this key
    Miss,
    /// Entry present and within its TTL
    Fresh(T),
    /// Entry present but past its TTL
    Stale(T),
}

// == Ttl Cache ==
/// Bounded key/value store with per-entry TTL and insertion-order eviction.
#[derive(Debug)]
pub struct TtlCache<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// Insertion-order tracker for the eviction tie-break
    order: InsertionOrder,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Default TTL for entries without an explicit TTL
    default_ttl: Duration,
}

impl<T> TtlCache<T> {
    // == Constructor ==
    /// Creates a new TtlCache with the given capacity and default TTL.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries the cache can hold
    /// * `default_ttl` - TTL applied when `set` is called without one
    pub fn new(max_entries: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            stats: CacheStats::new(),
            max_entries,
            default_ttl,
        }
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL. Always succeeds.
    ///
    /// If the key already exists the entry is replaced wholesale and its TTL
    /// restarts, but its eviction rank is unchanged. Inserting a new key at
    /// capacity evicts the oldest-inserted entry first; replacing an
    /// existing key is size-neutral and never evicts, even at capacity.
    pub fn set(&mut self, key: String, data: T, ttl: Option<Duration>) {
        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= self.max_entries {
            if let Some(evicted_key) = self.order.pop_oldest() {
                self.entries.remove(&evicted_key);
                self.stats.record_eviction();
            }
        }

        let effective_ttl = ttl.unwrap_or(self.default_ttl);
        self.entries
            .insert(key.clone(), CacheEntry::new(data, effective_ttl));
        if !is_overwrite {
            self.order.record_insert(key);
        }

        self.stats.set_total_entries(self.entries.len());
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether an entry was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.order.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    // == Delete Matching ==
    /// Removes every entry whose key contains `pattern` as a substring.
    ///
    /// Returns the number of entries removed.
    pub fn delete_matching(&mut self, pattern: &str) -> usize {
        let matching: Vec<String> = self
            .entries
            .keys()
            .filter(|key| key.contains(pattern))
            .cloned()
            .collect();

        for key in &matching {
            self.entries.remove(key);
            self.order.remove(key);
        }

        self.stats.set_total_entries(self.entries.len());
        matching.len()
    }

    // == Clear ==
    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.stats.set_total_entries(0);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Mutable access to the counters for the fetch layer.
    pub(crate) fn stats_mut(&mut self) -> &mut CacheStats {
        &mut self.stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the current number of entries in the cache.
    ///
    /// Alias for `len`, matching the cache operation vocabulary.
    pub fn size(&self) -> usize {
        self.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes an entry that was found expired on read.
    fn remove_expired(&mut self, key: &str) {
        self.entries.remove(key);
        self.order.remove(key);
        self.stats.record_expired();
        self.stats.set_total_entries(self.entries.len());
    }
}

impl<T: Clone> TtlCache<T> {
    // == Lookup ==
    /// Reads an entry without the lazy-delete side effect on stale data.
    ///
    /// Records a hit for fresh entries and a miss for absent keys; the
    /// caller decides how a stale entry is accounted for.
    pub(crate) fn lookup(&mut self, key: &str) -> Lookup<T> {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => Lookup::Stale(entry.data.clone()),
            Some(entry) => {
                self.stats.record_hit();
                Lookup::Fresh(entry.data.clone())
            }
            None => {
                self.stats.record_miss();
                Lookup::Miss
            }
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns the data if present and fresh. An expired entry is deleted
    /// as a side effect and counted as a miss.
    pub fn get(&mut self, key: &str) -> Option<T> {
        match self.lookup(key) {
            Lookup::Fresh(data) => Some(data),
            Lookup::Stale(_) => {
                self.remove_expired(key);
                self.stats.record_miss();
                None
            }
            Lookup::Miss => None,
        }
    }

    // == Has ==
    /// Checks whether a fresh entry exists for the key.
    ///
    /// Performs the same lazy-delete side effect as `get` on an expired
    /// entry, but does not count toward hits or misses.
    pub fn has(&mut self, key: &str) -> bool {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                self.remove_expired(key);
                false
            }
            Some(_) => true,
            None => false,
        }
    }
}
