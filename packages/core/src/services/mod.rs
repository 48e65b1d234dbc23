//! Business Services
//!
//! This module contains the services that sit between the HTTP surface and the
//! association store:
//!
//! - `WordExpansionService` - neighbor lookup with oracle fallback and write-through
//! - `PuzzleSelector` - deterministic, distance-constrained puzzle selection
//! - Monotonic caches for expansions and selected puzzles
//!
//! Services depend on `Arc<dyn AssociationStore>` and receive their caches by
//! injection, so one process can host several isolated instances.

pub mod cache;
pub mod error;
pub mod expansion_service;
pub mod puzzle_selector;

pub use cache::{ExpansionCache, MonotonicCache, PuzzleCache, PuzzleKey};
pub use error::GraphServiceError;
pub use expansion_service::WordExpansionService;
pub use puzzle_selector::PuzzleSelector;
