//! Monotonic In-Memory Caches
//!
//! Per-process caches for expansion results (keyed by normalized word) and
//! selected puzzles (keyed by mode and seed).
//!
//! # Semantics
//!
//! - **Never invalidated**: an entry lives for the lifetime of the cache
//! - **Last writer wins**: concurrent requests may both compute and insert the
//!   same key; cached values derive deterministically from the same inputs, so
//!   either result is acceptable
//! - **Injected**: services receive an `Arc` of the cache they use, which keeps
//!   tests isolated from each other

use crate::models::{day_bucket, PuzzleMode, PuzzleSpec};
use std::collections::HashMap;
use std::hash::Hash;
use tokio::sync::RwLock;

/// Insert-only map guarded by an async `RwLock`
pub struct MonotonicCache<K, V> {
    entries: RwLock<HashMap<K, V>>,
}

impl<K, V> Default for MonotonicCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> MonotonicCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn insert(&self, key: K, value: V) {
        self.entries.write().await.insert(key, value);
    }

    pub async fn contains(&self, key: &K) -> bool {
        self.entries.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Cache of `expand(word)` results
pub type ExpansionCache = MonotonicCache<String, Vec<String>>;

/// Cache of selected puzzles
pub type PuzzleCache = MonotonicCache<PuzzleKey, PuzzleSpec>;

/// Cache key for puzzles
///
/// Daily seeds are bucketed to their UTC day, so any timestamp within a day
/// maps to that day's puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PuzzleKey {
    pub mode: PuzzleMode,
    pub seed: i64,
}

impl PuzzleKey {
    pub fn new(mode: PuzzleMode, seed: i64) -> Self {
        let seed = match mode {
            PuzzleMode::Daily => day_bucket(seed),
            PuzzleMode::Unlimited | PuzzleMode::Bingo => seed,
        };
        Self { mode, seed }
    }
}
