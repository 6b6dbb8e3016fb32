//! Background Tasks
//!
//! Periodic auto-refresh of cached keys and statistics snapshots.

mod refresh;
mod snapshot;

pub use refresh::spawn_refresh_task;
pub use snapshot::{spawn_snapshot_task, FileSnapshotStore, SnapshotStore, StatsSnapshot};
