//! Statistics Snapshot Task
//!
//! Periodically persists cache statistics to an external key/value-style
//! store. Snapshots carry counters only: loading one restores statistics
//! for inspection but does not repopulate cache entries, since the cache
//! treats stored values as opaque.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, TtlCache};

// == Stats Snapshot ==
/// One persisted statistics record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,
    /// Counters at that moment
    pub stats: CacheStats,
}

// == Snapshot Store ==
/// Persistence capability for statistics snapshots.
///
/// Implementations store a single latest snapshot; `load` returns `None`
/// when nothing has been saved yet.
pub trait SnapshotStore: Send + Sync + 'static {
    /// Persists the snapshot, replacing any previous one.
    fn save(&self, snapshot: &StatsSnapshot) -> anyhow::Result<()>;

    /// Reads back the latest snapshot, if any.
    fn load(&self) -> anyhow::Result<Option<StatsSnapshot>>;
}

// == File Snapshot Store ==
/// Snapshot store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a store writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&self, snapshot: &StatsSnapshot) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    fn load(&self) -> anyhow::Result<Option<StatsSnapshot>> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_str(&json)?))
    }
}

// == Snapshot Task ==
/// Spawns a background task that snapshots cache statistics every
/// `interval`.
///
/// A failed save is logged and skipped. The task runs until the returned
/// handle is aborted.
pub fn spawn_snapshot_task<T>(
    cache: Arc<RwLock<TtlCache<T>>>,
    store: Arc<dyn SnapshotStore>,
    interval: Duration,
) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(
            interval_ms = interval.as_millis() as u64,
            "starting stats snapshot task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let stats = { cache.read().await.stats() };
            let snapshot = StatsSnapshot {
                taken_at: Utc::now(),
                stats,
            };

            match store.save(&snapshot) {
                Ok(()) => debug!("stats snapshot saved"),
                Err(err) => warn!(error = %err, "failed to save stats snapshot"),
            }
        }
    })
}
