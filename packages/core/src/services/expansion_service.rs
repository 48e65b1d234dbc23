//! Word-Graph Expansion Service
//!
//! Answers "what words are associated with W?" by combining the shared
//! association store with the language-model oracle:
//!
//! 1. Normalize `W`; an empty word is rejected
//! 2. Serve from the per-process expansion cache when present
//! 3. Read the stored neighbors of `W` (both edge directions)
//! 4. With fewer than `min_store_neighbors` stored neighbors, ask the oracle
//!    for candidates and write them through to the store as bidirectional edges
//! 5. Return the deduplicated union, stored neighbors first
//!
//! ## Failure Model
//!
//! - Store failures and store timeouts are fatal for the request
//! - Oracle failures and oracle timeouts degrade to "no candidates"; the stored
//!   neighbors are still returned and the degraded result is not cached, so a
//!   later request can retry the oracle
//! - Persistence of oracle candidates is best-effort; a failed write is logged
//!   and the candidates are still returned
//!
//! Repeated expansion of the same word never creates duplicate nodes or edges:
//! the store's upserts carry merge semantics.

use super::cache::ExpansionCache;
use super::error::{bounded_store_call, GraphServiceError};
use crate::config::ExpansionConfig;
use crate::db::AssociationStore;
use crate::models::{normalize_word, validate_word};
use semantical_oracle::AssociationOracle;
use std::collections::HashSet;
use std::sync::Arc;

/// Expands words into their associated neighbors
pub struct WordExpansionService {
    store: Arc<dyn AssociationStore>,
    oracle: Arc<dyn AssociationOracle>,
    cache: Arc<ExpansionCache>,
    config: ExpansionConfig,
}

impl WordExpansionService {
    /// Create a new expansion service
    ///
    /// # Errors
    ///
    /// Returns `GraphServiceError::Configuration` if `config` fails validation.
    pub fn new(
        store: Arc<dyn AssociationStore>,
        oracle: Arc<dyn AssociationOracle>,
        cache: Arc<ExpansionCache>,
        config: ExpansionConfig,
    ) -> Result<Self, GraphServiceError> {
        config
            .validate()
            .map_err(GraphServiceError::configuration)?;

        Ok(Self {
            store,
            oracle,
            cache,
            config,
        })
    }

    pub fn config(&self) -> &ExpansionConfig {
        &self.config
    }

    /// Associated words of `raw`, normalized and deduplicated
    ///
    /// The input word never appears in its own result.
    pub async fn expand(&self, raw: &str) -> Result<Vec<String>, GraphServiceError> {
        let word = validate_word(raw)?;

        if let Some(cached) = self.cache.get(&word).await {
            tracing::debug!(word = %word, "Expansion cache hit");
            return Ok(cached);
        }
        tracing::debug!(word = %word, "Expansion cache miss");

        let stored = bounded_store_call(
            "neighbor lookup",
            self.config.store_timeout(),
            self.store.neighbors(&word),
        )
        .await?;

        if stored.len() >= self.config.min_store_neighbors {
            let words = merge_unique(&word, stored, Vec::new());
            self.cache.insert(word, words.clone()).await;
            return Ok(words);
        }

        let Some(candidates) = self.consult_oracle(&word).await else {
            // Degraded result: serve what the store has, keep the cache empty
            return Ok(merge_unique(&word, stored, Vec::new()));
        };

        if !candidates.is_empty() {
            self.persist_candidates(&word, &candidates).await;
        }

        let words = merge_unique(&word, stored, candidates);
        tracing::info!(word = %word, count = words.len(), "Expanded word via oracle");
        self.cache.insert(word, words.clone()).await;
        Ok(words)
    }

    /// Ask the oracle for candidates; `None` when the oracle failed
    async fn consult_oracle(&self, word: &str) -> Option<Vec<String>> {
        let budget = self.config.oracle_timeout();
        let raw = match tokio::time::timeout(budget, self.oracle.associate(word)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                tracing::warn!(word = %word, "Association oracle failed: {}", e);
                return None;
            }
            Err(_) => {
                tracing::warn!(
                    word = %word,
                    "Association oracle timed out after {}s",
                    budget.as_secs()
                );
                return None;
            }
        };

        let mut seen = HashSet::new();
        let candidates: Vec<String> = raw
            .iter()
            .map(|candidate| normalize_word(candidate))
            .filter(|candidate| !candidate.is_empty() && candidate != word)
            .filter(|candidate| seen.insert(candidate.clone()))
            .take(self.config.max_oracle_candidates)
            .collect();

        tracing::debug!(word = %word, candidates = ?candidates, "Oracle candidates");
        Some(candidates)
    }

    /// Write `word`, each candidate and both edge directions to the store
    async fn persist_candidates(&self, word: &str, candidates: &[String]) {
        let budget = self.config.store_timeout();

        if let Err(e) = bounded_store_call("word upsert", budget, self.store.upsert_word(word)).await
        {
            tracing::warn!(word = %word, "Failed to persist expanded word: {}", e);
            return;
        }

        for candidate in candidates {
            let written = async {
                bounded_store_call("word upsert", budget, self.store.upsert_word(candidate))
                    .await?;
                bounded_store_call(
                    "association upsert",
                    budget,
                    self.store.upsert_association(word, candidate),
                )
                .await?;
                bounded_store_call(
                    "association upsert",
                    budget,
                    self.store.upsert_association(candidate, word),
                )
                .await
            }
            .await;

            if let Err(e) = written {
                tracing::warn!(
                    word = %word,
                    candidate = %candidate,
                    "Failed to persist association: {}",
                    e
                );
            }
        }
    }
}

/// Stored neighbors first, then new candidates; no duplicates, never `word`
fn merge_unique(word: &str, stored: Vec<String>, candidates: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    stored
        .into_iter()
        .chain(candidates)
        .filter(|candidate| candidate != word && seen.insert(candidate.clone()))
        .collect()
}
