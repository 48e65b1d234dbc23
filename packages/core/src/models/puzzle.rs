//! Puzzle Data Structures
//!
//! A `PuzzleSpec` is the immutable result of puzzle selection for one seed:
//! a start word, one or more goals (each with the shortest path that proved it
//! reachable), and the hint path the client replays for single-goal modes.
//!
//! Paths are full node sequences with both endpoints included, so a path of
//! `n` words spans `n - 1` edges.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Milliseconds in one UTC day
pub const DAY_MILLIS: i64 = 86_400_000;

/// Puzzle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PuzzleMode {
    /// One puzzle per UTC day, shared by every player
    Daily,
    /// Fresh puzzle per request time
    Unlimited,
    /// One start word, many independent goals
    Bingo,
}

impl PuzzleMode {
    pub fn is_multi_goal(&self) -> bool {
        matches!(self, PuzzleMode::Bingo)
    }
}

impl fmt::Display for PuzzleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PuzzleMode::Daily => write!(f, "daily"),
            PuzzleMode::Unlimited => write!(f, "unlimited"),
            PuzzleMode::Bingo => write!(f, "bingo"),
        }
    }
}

/// A goal word and one shortest path leading to it from the start word
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoalRoute {
    pub word: String,
    pub path: Vec<String>,
}

impl GoalRoute {
    pub fn new(word: impl Into<String>, path: Vec<String>) -> Self {
        Self {
            word: word.into(),
            path,
        }
    }

    /// Number of edges on the path
    pub fn distance(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Immutable puzzle selected for one `(mode, seed)`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleSpec {
    pub mode: PuzzleMode,
    pub seed: i64,
    pub start: String,
    /// 1..=9 goals in acceptance order
    pub goals: Vec<GoalRoute>,
    /// Path replayed by hints; empty for bingo
    pub hint_path: Vec<String>,
    /// True when selection fell back to the fixed default pair
    #[serde(default)]
    pub fallback: bool,
}

impl PuzzleSpec {
    /// Build a single-goal puzzle whose hint path is the goal's path
    pub fn single(mode: PuzzleMode, seed: i64, start: String, goal: GoalRoute) -> Self {
        let hint_path = goal.path.clone();
        Self {
            mode,
            seed,
            start,
            goals: vec![goal],
            hint_path,
            fallback: false,
        }
    }

    /// Build a multi-goal puzzle; bingo exposes no hints
    pub fn multi(mode: PuzzleMode, seed: i64, start: String, goals: Vec<GoalRoute>) -> Self {
        Self {
            mode,
            seed,
            start,
            goals,
            hint_path: Vec::new(),
            fallback: false,
        }
    }

    pub fn goal_words(&self) -> Vec<String> {
        self.goals.iter().map(|goal| goal.word.clone()).collect()
    }
}

/// Start-of-day UTC timestamp (milliseconds) for a calendar date
pub fn daily_seed(date: NaiveDate) -> i64 {
    let midnight = NaiveDateTime::new(date, NaiveTime::default());
    Utc.from_utc_datetime(&midnight).timestamp_millis()
}

/// Floor a millisecond timestamp to its UTC day
pub fn day_bucket(timestamp_millis: i64) -> i64 {
    timestamp_millis.div_euclid(DAY_MILLIS) * DAY_MILLIS
}
