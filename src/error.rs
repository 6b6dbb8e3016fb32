//! Error types for the cache and fetch layers
//!
//! Provides unified error handling using thiserror.
//!
//! Cache operations themselves are infallible; only the fetch layer
//! produces errors, and only when the wrapped producer does. The error is
//! `Clone` so that every caller attached to a coalesced fetch can observe
//! the same failure.

use thiserror::Error;

// == Fetch Error Enum ==
/// Errors surfaced by `CachedFetcher::get_data`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The wrapped producer rejected
    #[error("producer failed: {0}")]
    Producer(String),

    /// The fetch task panicked or was aborted before completing
    #[error("fetch task aborted: {0}")]
    Aborted(String),
}

// == Result Type Alias ==
/// Convenience Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
