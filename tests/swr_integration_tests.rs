//! Integration Tests
//!
//! Exercises the cache and fetch layers together: TTL scenarios, request
//! coalescing across tasks, stale-while-revalidate, failure isolation, and
//! the background refresh/snapshot tasks. All time-dependent scenarios run
//! on tokio's paused clock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time::{advance, Duration};
use tokio_test::assert_ok;

use swr_cache::{
    spawn_refresh_task, spawn_snapshot_task, CacheConfig, CachedFetcher, FetchOptions,
    FileSnapshotStore, SnapshotStore, TtlCache,
};

// == Helper Functions ==

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("swr_cache=debug")
        .with_test_writer()
        .try_init();
}

fn temp_snapshot_store(name: &str) -> FileSnapshotStore {
    let path = std::env::temp_dir().join(format!(
        "swr-cache-it-{}-{}.json",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    FileSnapshotStore::new(path)
}

// == Cache Scenarios ==

#[tokio::test(start_paused = true)]
async fn test_ttl_scenario_fresh_then_absent() {
    // ttl=1000ms: set 'x' at t=0, fresh at t=500, absent at t=1500
    let mut cache = TtlCache::new(10, Duration::from_secs(300));
    cache.set("x".to_string(), "A".to_string(), Some(Duration::from_millis(1000)));

    advance(Duration::from_millis(500)).await;
    assert_eq!(cache.get("x"), Some("A".to_string()));

    advance(Duration::from_millis(1000)).await;
    assert_eq!(cache.get("x"), None);
}

#[tokio::test(start_paused = true)]
async fn test_eviction_scenario_oldest_inserted_goes_first() {
    // maxSize=2: inserting a third key evicts the first-inserted one
    let mut cache = TtlCache::new(2, Duration::from_secs(300));

    cache.set("a".to_string(), 1, None);
    advance(Duration::from_millis(1)).await;
    cache.set("b".to_string(), 2, None);
    advance(Duration::from_millis(1)).await;
    cache.set("c".to_string(), 3, None);

    assert!(!cache.has("a"));
    assert!(cache.has("b"));
    assert!(cache.has("c"));
}

// == Coalescing ==

#[tokio::test(start_paused = true)]
async fn test_many_concurrent_callers_share_one_fetch() {
    init_tracing();

    let fetcher: Arc<CachedFetcher<String>> =
        Arc::new(CachedFetcher::new(10, FetchOptions::default()));
    let calls = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..5 {
        let fetcher = Arc::clone(&fetcher);
        let calls = Arc::clone(&calls);
        handles.push(tokio::spawn(async move {
            fetcher
                .get_data("report", move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(80)).await;
                    Ok("generated".to_string())
                })
                .await
        }));
    }

    for handle in handles {
        let value = assert_ok!(handle.await.unwrap());
        assert_eq!(value, "generated");
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1, "producer must run exactly once");
    assert_eq!(fetcher.pending_count().await, 0);
}

// == Stale While Revalidate ==

#[tokio::test(start_paused = true)]
async fn test_swr_serves_stale_then_new_value() {
    init_tracing();

    let options = FetchOptions {
        ttl: Duration::from_millis(1000),
        stale_while_revalidate: true,
    };
    let fetcher = CachedFetcher::new(10, options);

    assert_ok!(fetcher.get_data("stats", || async { Ok(1u64) }).await);

    advance(Duration::from_millis(1500)).await;

    // Past the TTL: the previous value comes back while the refresh runs
    let value = fetcher
        .get_data("stats", || async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            Ok(2u64)
        })
        .await
        .unwrap();
    assert_eq!(value, 1);

    tokio::time::sleep(Duration::from_millis(50)).await;

    let value = fetcher
        .get_data("stats", || async { Ok(99u64) })
        .await
        .unwrap();
    assert_eq!(value, 2, "refresh result should now be served");
}

// == Failure Isolation ==

#[tokio::test]
async fn test_failing_key_does_not_disturb_others() {
    let fetcher: CachedFetcher<String> = CachedFetcher::new(10, FetchOptions::default());

    assert_ok!(
        fetcher
            .get_data("good", || async { Ok("fine".to_string()) })
            .await
    );

    let result = fetcher
        .get_data("bad", || async { Err(anyhow::anyhow!("backend down")) })
        .await;
    assert!(result.is_err());

    // The failure is local to "bad"
    assert_eq!(fetcher.cached("good").await, Some("fine".to_string()));
    assert!(!fetcher.has_cached("bad").await);
}

#[tokio::test]
async fn test_revalidate_replaces_fresh_value() {
    let fetcher = CachedFetcher::new(10, FetchOptions::default());

    assert_ok!(fetcher.get_data("profile", || async { Ok("v1") }).await);

    let value = fetcher
        .revalidate("profile", || async { Ok("v2") })
        .await
        .unwrap();
    assert_eq!(value, "v2");
    assert_eq!(fetcher.cached("profile").await, Some("v2"));
}

// == Background Tasks ==

#[tokio::test(start_paused = true)]
async fn test_refresh_and_snapshot_tasks_together() {
    init_tracing();

    let config = CacheConfig {
        max_entries: 10,
        default_ttl: Duration::from_millis(500),
        stale_while_revalidate: false,
        refresh_interval: Duration::from_millis(600),
        snapshot_interval: Duration::from_millis(250),
    };

    let fetcher: Arc<CachedFetcher<u64>> = Arc::new(CachedFetcher::from_config(&config));
    let store = Arc::new(temp_snapshot_store("combined"));

    let tick = Arc::new(AtomicUsize::new(0));
    let producer_tick = Arc::clone(&tick);
    let refresh_handle = spawn_refresh_task(
        Arc::clone(&fetcher),
        "dashboard".to_string(),
        config.refresh_interval,
        move || {
            let n = producer_tick.fetch_add(1, Ordering::SeqCst) as u64;
            async move { Ok(n) }
        },
    );
    let snapshot_handle = spawn_snapshot_task(
        fetcher.cache(),
        Arc::clone(&store) as Arc<dyn SnapshotStore>,
        config.snapshot_interval,
    );

    // First refresh tick lands at 600ms; snapshots land every 250ms
    tokio::time::sleep(Duration::from_millis(700)).await;

    assert_eq!(fetcher.cached("dashboard").await, Some(0));
    let snapshot = store.load().unwrap().expect("snapshot should be written");
    assert!(snapshot.stats.total_entries <= 10);

    // The entry goes stale between ticks; the next tick refetches it
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(fetcher.cached("dashboard").await, Some(1));

    refresh_handle.abort();
    snapshot_handle.abort();
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_restores_stats_but_not_entries() {
    let store = temp_snapshot_store("stats-only");
    let cache = Arc::new(RwLock::new(TtlCache::new(10, Duration::from_secs(60))));

    {
        let mut cache = cache.write().await;
        cache.set("key".to_string(), "value".to_string(), None);
        cache.get("key");
    }

    let handle = spawn_snapshot_task(
        Arc::clone(&cache),
        Arc::new(store.clone()) as Arc<dyn SnapshotStore>,
        Duration::from_millis(100),
    );
    tokio::time::sleep(Duration::from_millis(150)).await;
    handle.abort();

    let snapshot = store.load().unwrap().expect("snapshot should exist");
    assert_eq!(snapshot.stats.hits, 1);
    assert_eq!(snapshot.stats.total_entries, 1);

    // A fresh cache stays empty: snapshots carry counters, not entries
    let restored: TtlCache<String> = TtlCache::new(10, Duration::from_secs(60));
    assert!(restored.is_empty());
}
