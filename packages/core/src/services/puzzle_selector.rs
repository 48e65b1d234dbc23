//! Puzzle Selector
//!
//! Deterministically picks a start word and goal word(s) for a `(mode, seed)`
//! such that every goal's shortest-path distance from the start falls inside
//! the mode's distance range.
//!
//! # Algorithm
//!
//! Selection reads a snapshot of the oldest `snapshot_limit` words, ordered by
//! creation time, and walks it with a fixed stride:
//!
//! - **Single goal** (daily, unlimited): the candidate pair at index `i` is
//!   `(words[i], words[i + 1])`, starting from `i = seed mod len`. A pair is
//!   accepted when a shortest path exists and its distance is in range;
//!   otherwise `i` advances by `stride`.
//! - **Bingo**: the start word is `words[seed mod len]`. Goal candidates come
//!   from the stride walk beginning at `seed + 1`; each must be distinct from
//!   the start and from earlier goals, and within range.
//!
//! Every search is bounded by `max_attempts` and stops early once the walk
//! revisits an index. When nothing is accepted the fixed fallback pair is
//! returned; a bingo walk with at least one accepted goal returns the partial
//! set.
//!
//! Daily seeds are bucketed to the UTC day before selection, so all requests
//! on the same day produce the same puzzle. Selected puzzles are cached by
//! `(mode, seed)`; fallback puzzles are not cached.

use super::cache::{PuzzleCache, PuzzleKey};
use super::error::{bounded_store_call, GraphServiceError};
use crate::config::{DistanceRange, SelectorConfig};
use crate::db::AssociationStore;
use crate::models::{GoalRoute, PuzzleMode, PuzzleSpec};
use std::collections::HashSet;
use std::sync::Arc;

/// Selects distance-constrained puzzles from the association store
pub struct PuzzleSelector {
    store: Arc<dyn AssociationStore>,
    cache: Arc<PuzzleCache>,
    config: SelectorConfig,
}

impl PuzzleSelector {
    /// Create a new selector
    ///
    /// # Errors
    ///
    /// Returns `GraphServiceError::Configuration` if `config` fails validation.
    pub fn new(
        store: Arc<dyn AssociationStore>,
        cache: Arc<PuzzleCache>,
        config: SelectorConfig,
    ) -> Result<Self, GraphServiceError> {
        config
            .validate()
            .map_err(GraphServiceError::configuration)?;

        Ok(Self {
            store,
            cache,
            config,
        })
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Distance range accepted for `mode`
    pub fn distance_range(&self, mode: PuzzleMode) -> DistanceRange {
        match mode {
            PuzzleMode::Daily => self.config.daily_distance,
            PuzzleMode::Unlimited => self.config.unlimited_distance,
            PuzzleMode::Bingo => self.config.bingo_distance,
        }
    }

    /// Puzzle for `(mode, seed)`
    ///
    /// Never fails for lack of an acceptable pair (the fallback puzzle is
    /// returned instead); store failures are propagated. Fallbacks and
    /// partial bingo sets are not cached.
    pub async fn select(&self, mode: PuzzleMode, seed: i64) -> Result<PuzzleSpec, GraphServiceError> {
        let key = PuzzleKey::new(mode, seed);

        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!(mode = %mode, seed = key.seed, "Puzzle cache hit");
            return Ok(cached);
        }

        let selected = match mode {
            PuzzleMode::Bingo => self.select_bingo(key.seed).await,
            PuzzleMode::Daily | PuzzleMode::Unlimited => self.select_single(mode, key.seed).await,
        };

        match selected {
            Ok(spec) => {
                // A partial bingo set may fill up as the graph grows
                if !self.is_partial(&spec) {
                    self.cache.insert(key, spec.clone()).await;
                }
                Ok(spec)
            }
            Err(GraphServiceError::SelectionExhausted { attempts }) => {
                tracing::warn!(
                    mode = %mode,
                    seed = key.seed,
                    attempts,
                    "Puzzle selection exhausted, serving fallback pair"
                );
                Ok(self.fallback(mode, key.seed))
            }
            Err(e) => Err(e),
        }
    }

    /// Single-goal search over consecutive snapshot pairs
    ///
    /// # Errors
    ///
    /// `SelectionExhausted` when no pair is accepted within the attempt budget.
    pub async fn select_single(
        &self,
        mode: PuzzleMode,
        seed: i64,
    ) -> Result<PuzzleSpec, GraphServiceError> {
        let range = self.distance_range(mode);
        let words = self.snapshot().await?;
        if words.is_empty() {
            return Err(GraphServiceError::selection_exhausted(0));
        }

        let len = words.len();
        let mut index = wrap_index(seed, len);
        let mut tried = HashSet::new();
        let mut attempts = 0;

        while attempts < self.config.max_attempts && tried.insert(index) {
            attempts += 1;
            let start = &words[index];
            let goal = &words[(index + 1) % len];

            if start != goal {
                if let Some(path) = self.path_within(start, goal, range).await? {
                    tracing::info!(
                        mode = %mode,
                        seed,
                        start = %start,
                        goal = %goal,
                        distance = path.len() - 1,
                        attempts,
                        "Selected puzzle"
                    );
                    return Ok(PuzzleSpec::single(
                        mode,
                        seed,
                        start.clone(),
                        GoalRoute::new(goal.clone(), path),
                    ));
                }
            }

            tracing::debug!(index, start = %start, goal = %goal, "Rejected candidate pair");
            index = (index + self.config.stride) % len;
        }

        Err(GraphServiceError::selection_exhausted(attempts))
    }

    /// Multi-goal search for bingo
    ///
    /// # Errors
    ///
    /// `SelectionExhausted` when not a single goal is accepted within the
    /// attempt budget.
    pub async fn select_bingo(&self, seed: i64) -> Result<PuzzleSpec, GraphServiceError> {
        let range = self.config.bingo_distance;
        let words = self.snapshot().await?;
        if words.is_empty() {
            return Err(GraphServiceError::selection_exhausted(0));
        }

        let len = words.len();
        let start = words[wrap_index(seed, len)].clone();
        let mut cursor = wrap_index(seed.wrapping_add(1), len);
        let mut tried = HashSet::new();
        let mut goals: Vec<GoalRoute> = Vec::new();
        let mut attempts = 0;

        while goals.len() < self.config.bingo_goal_count
            && attempts < self.config.max_attempts
            && tried.insert(cursor)
        {
            attempts += 1;
            let candidate = &words[cursor];

            let duplicate = goals.iter().any(|goal| &goal.word == candidate);
            if candidate != &start && !duplicate {
                if let Some(path) = self.path_within(&start, candidate, range).await? {
                    tracing::debug!(goal = %candidate, distance = path.len() - 1, "Accepted bingo goal");
                    goals.push(GoalRoute::new(candidate.clone(), path));
                }
            }

            cursor = (cursor + self.config.stride) % len;
        }

        if goals.is_empty() {
            return Err(GraphServiceError::selection_exhausted(attempts));
        }

        if goals.len() < self.config.bingo_goal_count {
            tracing::warn!(
                seed,
                found = goals.len(),
                wanted = self.config.bingo_goal_count,
                attempts,
                "Bingo selection exhausted, serving partial goal set"
            );
        } else {
            tracing::info!(seed, start = %start, attempts, "Selected bingo puzzle");
        }

        Ok(PuzzleSpec::multi(PuzzleMode::Bingo, seed, start, goals))
    }

    fn is_partial(&self, spec: &PuzzleSpec) -> bool {
        spec.mode.is_multi_goal() && spec.goals.len() < self.config.bingo_goal_count
    }

    /// Fixed puzzle served when selection is exhausted
    pub fn fallback(&self, mode: PuzzleMode, seed: i64) -> PuzzleSpec {
        let start = self.config.fallback_start.clone();
        let goal = self.config.fallback_goal.clone();
        let route = GoalRoute::new(goal.clone(), vec![start.clone(), goal]);

        let mut spec = if mode.is_multi_goal() {
            PuzzleSpec::multi(mode, seed, start, vec![route])
        } else {
            PuzzleSpec::single(mode, seed, start, route)
        };
        spec.fallback = true;
        spec
    }

    async fn snapshot(&self) -> Result<Vec<String>, GraphServiceError> {
        bounded_store_call(
            "word snapshot",
            self.config.store_timeout(),
            self.store.words_by_creation(self.config.snapshot_limit),
        )
        .await
    }

    /// Shortest path from `start` to `goal` if its distance lies in `range`
    async fn path_within(
        &self,
        start: &str,
        goal: &str,
        range: DistanceRange,
    ) -> Result<Option<Vec<String>>, GraphServiceError> {
        let path = bounded_store_call(
            "shortest path",
            self.config.store_timeout(),
            self.store.shortest_path(start, goal, range.max),
        )
        .await?;

        Ok(path.filter(|path| range.contains(path.len().saturating_sub(1))))
    }
}

/// `value mod len` as a non-negative index
fn wrap_index(value: i64, len: usize) -> usize {
    value.rem_euclid(len as i64) as usize
}
