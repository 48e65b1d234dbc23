//! JSON bodies exchanged between the HTTP endpoints and the client
//!
//! Contract types: the browser front-end and `semantical-client` both read these
//! shapes, so field names are part of the public API.

use super::puzzle::{GoalRoute, PuzzleMode, PuzzleSpec};
use serde::{Deserialize, Serialize};

/// `GET /start.json` → `{ words: [start, goal], path: [...] }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StartResponse {
    pub words: Vec<String>,
    pub path: Vec<String>,
}

/// One bingo goal: `{ word, path }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BingoEnd {
    pub word: String,
    pub path: Vec<String>,
}

/// `GET /bingo.json` → `{ start, ends: [...] }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BingoResponse {
    pub start: String,
    pub ends: Vec<BingoEnd>,
}

/// `GET /word.json` → `{ words: [...] }`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordsResponse {
    pub words: Vec<String>,
}

impl From<&PuzzleSpec> for StartResponse {
    fn from(spec: &PuzzleSpec) -> Self {
        let mut words = vec![spec.start.clone()];
        words.extend(spec.goals.first().map(|goal| goal.word.clone()));
        Self {
            words,
            path: spec.hint_path.clone(),
        }
    }
}

impl From<&PuzzleSpec> for BingoResponse {
    fn from(spec: &PuzzleSpec) -> Self {
        Self {
            start: spec.start.clone(),
            ends: spec
                .goals
                .iter()
                .map(|goal| BingoEnd {
                    word: goal.word.clone(),
                    path: goal.path.clone(),
                })
                .collect(),
        }
    }
}

impl StartResponse {
    /// Rebuild a single-goal puzzle on the client side
    ///
    /// Returns `None` when the body does not name both a start and a goal.
    pub fn into_puzzle(self, mode: PuzzleMode, seed: i64) -> Option<PuzzleSpec> {
        let mut words = self.words.into_iter();
        let start = words.next()?;
        let goal = words.next()?;
        Some(PuzzleSpec::single(
            mode,
            seed,
            start,
            GoalRoute::new(goal, self.path),
        ))
    }
}

impl BingoResponse {
    pub fn into_puzzle(self, seed: i64) -> PuzzleSpec {
        let goals = self
            .ends
            .into_iter()
            .map(|end| GoalRoute::new(end.word, end.path))
            .collect();
        PuzzleSpec::multi(PuzzleMode::Bingo, seed, self.start, goals)
    }
}
