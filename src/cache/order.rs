//! Insertion Order Module
//!
//! Tracks the order in which keys were first inserted, used as the eviction
//! tie-break: the oldest-inserted key is evicted first. This is an
//! approximation of LRU by insertion order, not access order: reading a key
//! does not change its eviction rank.

use std::collections::VecDeque;

// == Insertion Order Tracker ==
/// Tracks key insertion order for eviction.
///
/// Keys are stored in a VecDeque where:
/// - Front = Oldest inserted (next eviction candidate)
/// - Back = Newest inserted
#[derive(Debug, Default)]
pub struct InsertionOrder {
    /// Keys in insertion order
    order: VecDeque<String>,
}

impl InsertionOrder {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Record Insert ==
    /// Records a newly inserted key at the back of the order.
    ///
    /// Re-recording an existing key keeps its original position: replacing
    /// a value does not refresh the key's eviction rank.
    pub fn record_insert(&mut self, key: String) {
        if !self.contains(&key) {
            self.order.push_back(key);
        }
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Pop Oldest ==
    /// Returns and removes the oldest-inserted key.
    ///
    /// Returns None if the tracker is empty.
    pub fn pop_oldest(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    // == Peek Oldest ==
    /// Returns the oldest-inserted key without removing it.
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.front()
    }

    // == Clear ==
    /// Removes all tracked keys.
    pub fn clear(&mut self) {
        self.order.clear();
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }
}
