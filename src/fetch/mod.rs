//! Fetch Module
//!
//! Cache-backed data fetching with request coalescing and
//! stale-while-revalidate.

mod fetcher;

pub use fetcher::{CachedFetcher, FetchOptions};
