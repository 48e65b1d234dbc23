/// Configuration for the expansion service and the puzzle selector
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound for any store or oracle time budget
const MAX_TIMEOUT_SECS: u64 = 600;

/// Inclusive range of acceptable shortest-path distances (in edges)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceRange {
    pub min: usize,
    pub max: usize,
}

impl DistanceRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, distance: usize) -> bool {
        (self.min..=self.max).contains(&distance)
    }
}

/// Configuration for `WordExpansionService`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionConfig {
    /// Stored neighbor count at or above which the oracle is not consulted
    pub min_store_neighbors: usize,

    /// Oracle candidates kept after normalization
    pub max_oracle_candidates: usize,

    /// Budget for each store call
    pub store_timeout_secs: u64,

    /// Budget for one oracle call
    pub oracle_timeout_secs: u64,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            min_store_neighbors: 2,
            max_oracle_candidates: 5,
            store_timeout_secs: 30,
            oracle_timeout_secs: 30,
        }
    }
}

impl ExpansionConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_store_neighbors == 0 {
            return Err("min_store_neighbors must be greater than 0".to_string());
        }

        if self.max_oracle_candidates == 0 {
            return Err("max_oracle_candidates must be greater than 0".to_string());
        }

        validate_timeout("store_timeout_secs", self.store_timeout_secs)?;
        validate_timeout("oracle_timeout_secs", self.oracle_timeout_secs)
    }
}

/// Configuration for `PuzzleSelector`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Number of oldest words considered for selection
    pub snapshot_limit: usize,

    /// Index step after a rejected candidate
    pub stride: usize,

    /// Candidates examined before selection gives up
    pub max_attempts: usize,

    pub unlimited_distance: DistanceRange,
    pub daily_distance: DistanceRange,
    pub bingo_distance: DistanceRange,

    /// Goals per bingo puzzle
    pub bingo_goal_count: usize,

    /// Budget for each store call
    pub store_timeout_secs: u64,

    /// Pair served when nothing acceptable is found
    pub fallback_start: String,
    pub fallback_goal: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            snapshot_limit: 3000,
            stride: 100,
            max_attempts: 300,
            unlimited_distance: DistanceRange::new(5, 12),
            daily_distance: DistanceRange::new(8, 12),
            bingo_distance: DistanceRange::new(3, 12),
            bingo_goal_count: 9,
            store_timeout_secs: 30,
            fallback_start: "human".to_string(),
            fallback_goal: "girl".to_string(),
        }
    }
}

impl SelectorConfig {
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.snapshot_limit == 0 {
            return Err("snapshot_limit must be greater than 0".to_string());
        }

        if self.stride == 0 {
            return Err("stride must be greater than 0".to_string());
        }

        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".to_string());
        }

        for (name, range) in [
            ("unlimited_distance", self.unlimited_distance),
            ("daily_distance", self.daily_distance),
            ("bingo_distance", self.bingo_distance),
        ] {
            if range.min == 0 || range.min > range.max {
                return Err(format!(
                    "{} must satisfy 0 < min <= max (got {}..={})",
                    name, range.min, range.max
                ));
            }
        }

        if self.bingo_goal_count == 0 {
            return Err("bingo_goal_count must be greater than 0".to_string());
        }

        if self.fallback_start.trim().is_empty() || self.fallback_goal.trim().is_empty() {
            return Err("fallback pair cannot be empty".to_string());
        }

        validate_timeout("store_timeout_secs", self.store_timeout_secs)
    }
}

fn validate_timeout(name: &str, secs: u64) -> Result<(), String> {
    if secs == 0 {
        return Err(format!("{} must be greater than 0", name));
    }

    if secs > MAX_TIMEOUT_SECS {
        return Err(format!("{} cannot exceed {}", name, MAX_TIMEOUT_SECS));
    }

    Ok(())
}
