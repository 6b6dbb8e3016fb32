//! Cache Module
//!
//! Provides a bounded in-memory cache with per-entry TTL, lazy expiry on
//! read, and insertion-order eviction.

mod entry;
mod order;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use order::InsertionOrder;
pub use stats::CacheStats;
pub use store::TtlCache;

pub(crate) use store::Lookup;
