//! Cached Fetcher Module
//!
//! Wraps an asynchronous producer with the TTL cache: fresh values are
//! served from the cache, concurrent fetches for the same key are coalesced
//! into a single in-flight request, and stale values can be served
//! immediately while a background refresh runs.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Duration;
use tracing::{debug, warn};

use crate::cache::{CacheStats, Lookup, TtlCache};
use crate::config::CacheConfig;
use crate::error::{FetchError, Result};

/// One coalesced fetch: every caller for the key awaits the same handle.
type SharedFetch<T> = Shared<BoxFuture<'static, Result<T>>>;

// == Fetch Options ==
/// Per-fetcher behavior knobs.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// TTL written with every successful fetch
    pub ttl: Duration,
    /// Serve stale values immediately while refreshing in the background
    pub stale_while_revalidate: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            stale_while_revalidate: false,
        }
    }
}

impl FetchOptions {
    /// Builds options from a CacheConfig.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            ttl: config.default_ttl,
            stale_while_revalidate: config.stale_while_revalidate,
        }
    }
}

// == Cached Fetcher ==
/// Cache-backed fetch coordinator.
///
/// Explicitly constructed and shared via `Arc`; there is no global
/// instance. Cloning shares the same cache and in-flight table.
pub struct CachedFetcher<T> {
    /// Backing cache, shared with background tasks
    cache: Arc<RwLock<TtlCache<T>>>,
    /// At most one pending producer per key
    in_flight: Arc<Mutex<HashMap<String, SharedFetch<T>>>>,
    /// Fetch behavior
    options: FetchOptions,
}

impl<T> Clone for CachedFetcher<T> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            in_flight: Arc::clone(&self.in_flight),
            options: self.options.clone(),
        }
    }
}

impl<T> CachedFetcher<T> {
    // == Constructors ==
    /// Creates a fetcher over a fresh cache with the given capacity.
    ///
    /// The cache's default TTL matches `options.ttl`.
    pub fn new(max_entries: usize, options: FetchOptions) -> Self {
        let cache = TtlCache::new(max_entries, options.ttl);
        Self::with_cache(Arc::new(RwLock::new(cache)), options)
    }

    /// Creates a fetcher over an existing shared cache.
    pub fn with_cache(cache: Arc<RwLock<TtlCache<T>>>, options: FetchOptions) -> Self {
        Self {
            cache,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            options,
        }
    }

    /// Creates a fetcher from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, FetchOptions::from_config(config))
    }

    /// Returns a handle to the backing cache, for background tasks.
    pub fn cache(&self) -> Arc<RwLock<TtlCache<T>>> {
        Arc::clone(&self.cache)
    }

    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.cache.read().await.stats()
    }

    /// Number of fetches currently in flight, across all keys.
    pub async fn pending_count(&self) -> usize {
        self.in_flight.lock().await.len()
    }
}

impl<T: Clone + Send + Sync + 'static> CachedFetcher<T> {
    // == Get Data ==
    /// Returns the data for `key`, fetching through `producer` when needed.
    ///
    /// - Fresh cache entry: returned directly, producer not invoked.
    /// - No entry: a coalesced fetch runs; concurrent callers for the same
    ///   key attach to the same in-flight request and receive the same
    ///   result. A producer failure is returned as `FetchError::Producer`.
    /// - Stale entry with `stale_while_revalidate`: the stale value is
    ///   returned immediately and a background refresh is started (or
    ///   joined). A background failure is logged and swallowed; the stale
    ///   entry is left untouched.
    /// - Stale entry without it: behaves like a miss, except that a failed
    ///   refetch falls back to the stale value instead of erroring.
    ///
    /// Fails only when the producer rejects and no cached value exists to
    /// fall back on.
    pub async fn get_data<F, Fut>(&self, key: &str, producer: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let stale_fallback;
        {
            let mut cache = self.cache.write().await;
            match cache.lookup(key) {
                Lookup::Fresh(data) => return Ok(data),
                Lookup::Stale(data) if self.options.stale_while_revalidate => {
                    cache.stats_mut().record_stale_hit();
                    drop(cache);
                    let _refresh = self.join_or_start(key, producer).await;
                    debug!(key, "serving stale value while revalidating");
                    return Ok(data);
                }
                Lookup::Stale(data) => {
                    cache.stats_mut().record_miss();
                    stale_fallback = Some(data);
                }
                Lookup::Miss => stale_fallback = None,
            }
        }

        let pending = self.join_or_start(key, producer).await;
        match pending.await {
            Ok(data) => Ok(data),
            Err(err) => match stale_fallback {
                Some(data) => {
                    warn!(key, error = %err, "refetch failed, serving last cached value");
                    Ok(data)
                }
                None => Err(err),
            },
        }
    }

    // == Invalidate ==
    /// Removes the cached entry for `key`.
    ///
    /// Does not cancel an in-flight fetch for the key; a fetch already
    /// started runs to completion and repopulates the cache.
    pub async fn invalidate(&self, key: &str) -> bool {
        self.cache.write().await.delete(key)
    }

    /// Removes every cached entry whose key contains `pattern`.
    pub async fn invalidate_matching(&self, pattern: &str) -> usize {
        self.cache.write().await.delete_matching(pattern)
    }

    // == Revalidate ==
    /// Drops the cached entry and fetches a fresh value.
    pub async fn revalidate<F, Fut>(&self, key: &str, producer: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        self.invalidate(key).await;
        self.get_data(key, producer).await
    }

    // == Cached Reads ==
    /// Returns the cached value for `key` if present and fresh.
    pub async fn cached(&self, key: &str) -> Option<T> {
        self.cache.write().await.get(key)
    }

    /// Checks whether a fresh cached value exists for `key`.
    pub async fn has_cached(&self, key: &str) -> bool {
        self.cache.write().await.has(key)
    }

    /// Clears all cached entries.
    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    // == Join Or Start ==
    /// Attaches to the pending fetch for `key`, or starts one.
    ///
    /// The producer runs on a spawned task so the fetch completes and
    /// populates the cache even if every waiter stops waiting. The in-flight
    /// slot is cleared by the task itself, after the cache write, so a
    /// caller can never observe an empty slot with an unfinished fetch.
    /// Producer panics are caught so the slot is cleared on that path too;
    /// a panicked fetch surfaces as `FetchError::Aborted` and the next call
    /// for the key starts a fresh fetch.
    async fn join_or_start<F, Fut>(&self, key: &str, producer: F) -> SharedFetch<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let mut in_flight = self.in_flight.lock().await;
        if let Some(pending) = in_flight.get(key) {
            return pending.clone();
        }

        let fut = producer();
        let cache = Arc::clone(&self.cache);
        let slots = Arc::clone(&self.in_flight);
        let owned_key = key.to_string();
        let ttl = self.options.ttl;

        let handle = tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(Ok(data)) => {
                    cache
                        .write()
                        .await
                        .set(owned_key.clone(), data.clone(), Some(ttl));
                    Ok(data)
                }
                Ok(Err(err)) => {
                    // Failures never evict previously cached data
                    warn!(key = %owned_key, error = %err, "producer failed");
                    Err(FetchError::Producer(err.to_string()))
                }
                Err(panic) => {
                    let message = panic
                        .downcast_ref::<&str>()
                        .map(|s| s.to_string())
                        .or_else(|| panic.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| "producer panicked".to_string());
                    warn!(key = %owned_key, panic = %message, "producer panicked");
                    Err(FetchError::Aborted(message))
                }
            };
            slots.lock().await.remove(&owned_key);
            outcome
        });

        let pending: SharedFetch<T> = async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(err) => Err(FetchError::Aborted(err.to_string())),
            }
        }
        .boxed()
        .shared();

        in_flight.insert(key.to_string(), pending.clone());
        pending
    }
}
