//! Word Source Seam
//!
//! The engine reaches the word graph only through [`WordSource`]. Two
//! implementations ship with the crate:
//!
//! - [`ApiClient`](crate::ApiClient) - the JSON endpoints over HTTP
//! - [`LocalSource`] - the expansion service and puzzle selector in-process,
//!   for embedding the engine without a server

use crate::error::{ClientError, Result};
use async_trait::async_trait;
use semantical_core::{GraphServiceError, PuzzleMode, PuzzleSelector, PuzzleSpec, WordExpansionService};
use std::sync::Arc;

/// Provider of expansions and puzzles
#[async_trait]
pub trait WordSource: Send + Sync {
    /// Words associated with `word`
    async fn related_words(&self, word: &str) -> Result<Vec<String>>;

    /// Puzzle for `(mode, seed)`
    async fn puzzle(&self, mode: PuzzleMode, seed: i64) -> Result<PuzzleSpec>;
}

/// `WordSource` backed by in-process services
pub struct LocalSource {
    expansion: Arc<WordExpansionService>,
    selector: Arc<PuzzleSelector>,
}

impl LocalSource {
    pub fn new(expansion: Arc<WordExpansionService>, selector: Arc<PuzzleSelector>) -> Self {
        Self {
            expansion,
            selector,
        }
    }
}

impl From<GraphServiceError> for ClientError {
    fn from(err: GraphServiceError) -> Self {
        match err {
            GraphServiceError::InvalidWord(e) => ClientError::InvalidWord(e.to_string()),
            GraphServiceError::Timeout { secs, .. } => ClientError::Timeout(secs),
            other => ClientError::Transport(other.to_string()),
        }
    }
}

#[async_trait]
impl WordSource for LocalSource {
    async fn related_words(&self, word: &str) -> Result<Vec<String>> {
        Ok(self.expansion.expand(word).await?)
    }

    async fn puzzle(&self, mode: PuzzleMode, seed: i64) -> Result<PuzzleSpec> {
        Ok(self.selector.select(mode, seed).await?)
    }
}
