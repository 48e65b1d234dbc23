//! AssociationStore Trait - Word Graph Abstraction Layer
//!
//! This module defines the `AssociationStore` trait that abstracts the shared,
//! persistent graph of words and "associated-with" edges. Services depend on the
//! trait only, so the embedded SurrealDB store and the in-memory store are
//! interchangeable.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: all methods are async; the production store is a database
//! 2. **Merge Semantics**: `upsert_word` and `upsert_association` are idempotent and
//!    must stay correct under concurrent writers
//! 3. **Directed Storage, Undirected Distance**: edges are stored directed, while
//!    `neighbors` and `shortest_path` follow edges in both directions
//! 4. **Error Handling**: `anyhow::Result` with query context, converted to
//!    service errors by the caller
//!
//! # Examples
//!
//! ```rust
//! use semantical_core::db::{AssociationStore, MemoryAssociationStore};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let store = MemoryAssociationStore::new();
//! store.upsert_word("human").await?;
//! store.upsert_word("girl").await?;
//! store.upsert_association("human", "girl").await?;
//!
//! assert_eq!(store.neighbors("girl").await?, vec!["human".to_string()]);
//! # Ok(())
//! # }
//! ```

use crate::models::WordNode;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Node and edge counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub words: usize,
    pub associations: usize,
}

/// Persistent directed graph of words
///
/// All word arguments are expected to be normalized already.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; a single store is shared by every
/// request handler.
#[async_trait]
pub trait AssociationStore: Send + Sync {
    /// Insert a word if missing and return the stored node
    ///
    /// The creation timestamp of an existing word is never changed.
    async fn upsert_word(&self, word: &str) -> Result<WordNode>;

    /// Point lookup
    async fn get_word(&self, word: &str) -> Result<Option<WordNode>>;

    /// Create the directed edge `source -> target` if missing
    ///
    /// Returns `true` when an edge was created. Self-edges and edges touching an
    /// unknown word are no-ops returning `false`.
    async fn upsert_association(&self, source: &str, target: &str) -> Result<bool>;

    /// Targets of edges leaving `word`
    async fn outgoing(&self, word: &str) -> Result<Vec<String>>;

    /// Sources of edges entering `word`
    async fn incoming(&self, word: &str) -> Result<Vec<String>>;

    /// Words reachable over one edge in either direction, deduplicated,
    /// outgoing first
    async fn neighbors(&self, word: &str) -> Result<Vec<String>> {
        let mut seen = HashSet::new();
        let mut words = Vec::new();
        for neighbor in self
            .outgoing(word)
            .await?
            .into_iter()
            .chain(self.incoming(word).await?)
        {
            if neighbor != word && seen.insert(neighbor.clone()) {
                words.push(neighbor);
            }
        }
        Ok(words)
    }

    /// Up to `limit` words ordered by creation time (ties by word)
    async fn words_by_creation(&self, limit: usize) -> Result<Vec<String>>;

    /// One shortest undirected path from `from` to `to`, both endpoints included
    ///
    /// Returns `None` when either word is unknown or no path of at most
    /// `max_depth` edges exists.
    async fn shortest_path(
        &self,
        from: &str,
        to: &str,
        max_depth: usize,
    ) -> Result<Option<Vec<String>>> {
        breadth_first_path(self, from, to, max_depth).await
    }

    /// Word and edge counts
    async fn stats(&self) -> Result<StoreStats>;
}

/// Breadth-first search over `AssociationStore::neighbors`
///
/// Neighbors are visited in lexicographic order so that the returned path is
/// the same for every store holding the same graph.
pub async fn breadth_first_path<S>(
    store: &S,
    from: &str,
    to: &str,
    max_depth: usize,
) -> Result<Option<Vec<String>>>
where
    S: AssociationStore + ?Sized,
{
    if store.get_word(from).await?.is_none() || store.get_word(to).await?.is_none() {
        return Ok(None);
    }
    if from == to {
        return Ok(Some(vec![from.to_string()]));
    }

    let mut parents: HashMap<String, String> = HashMap::new();
    let mut visited: HashSet<String> = HashSet::from([from.to_string()]);
    let mut frontier = vec![from.to_string()];

    for _ in 0..max_depth {
        let mut next = Vec::new();
        for word in &frontier {
            let mut neighbors = store.neighbors(word).await?;
            neighbors.sort();
            for neighbor in neighbors {
                if !visited.insert(neighbor.clone()) {
                    continue;
                }
                parents.insert(neighbor.clone(), word.clone());
                if neighbor == to {
                    return Ok(Some(rebuild_path(&parents, from, to)));
                }
                next.push(neighbor);
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    Ok(None)
}

/// Walk the parent map back from `to` and return the path start-first
pub(crate) fn rebuild_path(parents: &HashMap<String, String>, from: &str, to: &str) -> Vec<String> {
    let mut path = vec![to.to_string()];
    let mut current = to;
    while current != from {
        match parents.get(current) {
            Some(parent) => {
                path.push(parent.clone());
                current = parent;
            }
            None => break,
        }
    }
    path.reverse();
    path
}
