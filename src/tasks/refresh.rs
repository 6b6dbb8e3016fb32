//! Auto-Refresh Task
//!
//! Background task that periodically re-fetches a key through the cached
//! fetcher, keeping dashboard-style data warm. Each tick goes through the
//! normal `get_data` path, so a tick that overlaps an in-flight fetch for
//! the same key attaches to it instead of issuing a duplicate request.

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::fetch::CachedFetcher;

/// Spawns a background task that refreshes `key` every `interval`.
///
/// A failed tick is logged and skipped; the previously cached value stays
/// in place. The task runs until the returned handle is aborted.
///
/// # Arguments
/// * `fetcher` - Shared fetcher driving the refresh
/// * `key` - Cache key to keep warm
/// * `interval` - Time between refresh ticks
/// * `producer` - Factory invoked to produce each refresh future
///
/// # Example
/// ```ignore
/// let handle = spawn_refresh_task(fetcher, "dashboard-stats".into(),
///     Duration::from_secs(300), move || client.fetch_stats());
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_refresh_task<T, F, Fut>(
    fetcher: Arc<CachedFetcher<T>>,
    key: String,
    interval: Duration,
    producer: F,
) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    tokio::spawn(async move {
        info!(key = %key, interval_ms = interval.as_millis() as u64, "starting auto-refresh task");

        loop {
            tokio::time::sleep(interval).await;

            match fetcher.get_data(&key, &producer).await {
                Ok(_) => debug!(key = %key, "auto-refresh tick complete"),
                Err(err) => warn!(key = %key, error = %err, "auto-refresh tick failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchOptions;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_refresh_task_keeps_value_fresh() {
        let options = FetchOptions {
            ttl: Duration::from_millis(500),
            stale_while_revalidate: false,
        };
        let fetcher = Arc::new(CachedFetcher::new(10, options));
        let calls = Arc::new(AtomicUsize::new(0));

        let producer_calls = calls.clone();
        let handle = spawn_refresh_task(
            fetcher.clone(),
            "stats".to_string(),
            Duration::from_millis(400),
            move || {
                let n = producer_calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(n) }
            },
        );

        // Ticks at 400/800/1200ms: the 800ms tick hits a fresh entry, the
        // 1200ms tick finds it stale and refetches
        tokio::time::sleep(Duration::from_millis(1300)).await;

        assert!(calls.load(Ordering::SeqCst) >= 2);
        assert!(fetcher.has_cached("stats").await);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_task_survives_producer_failure() {
        let fetcher: Arc<CachedFetcher<u32>> =
            Arc::new(CachedFetcher::new(10, FetchOptions::default()));

        let handle = spawn_refresh_task(
            fetcher.clone(),
            "stats".to_string(),
            Duration::from_millis(100),
            || async { Err(anyhow::anyhow!("backend down")) },
        );

        tokio::time::sleep(Duration::from_millis(350)).await;

        // Failures are logged and skipped; the task is still running
        assert!(!handle.is_finished());
        assert!(!fetcher.has_cached("stats").await);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_task_can_be_aborted() {
        let fetcher: Arc<CachedFetcher<u32>> =
            Arc::new(CachedFetcher::new(10, FetchOptions::default()));

        let handle = spawn_refresh_task(
            fetcher,
            "stats".to_string(),
            Duration::from_millis(100),
            || async { Ok(1) },
        );

        handle.abort();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
