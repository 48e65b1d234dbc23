//! Data Models
//!
//! This module contains the core data structures used throughout Semantical:
//!
//! - `WordNode` / `AssociationEdge` - the persistent word graph
//! - `PuzzleSpec` / `GoalRoute` - immutable puzzles produced by selection
//! - Wire types - JSON bodies of `/start.json`, `/bingo.json` and `/word.json`

mod puzzle;
pub mod wire;
mod word;

pub use puzzle::{daily_seed, day_bucket, GoalRoute, PuzzleMode, PuzzleSpec, DAY_MILLIS};
pub use wire::{BingoEnd, BingoResponse, StartResponse, WordsResponse};
pub use word::{normalize_word, validate_word, AssociationEdge, WordError, WordNode};
