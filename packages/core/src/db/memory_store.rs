//! In-Memory Association Store
//!
//! A process-local `AssociationStore` for tests, demos and throwaway servers.
//! All state sits behind one `tokio::sync::RwLock`, which makes every upsert
//! atomic and therefore idempotent under concurrent writers.

use super::association_store::{rebuild_path, AssociationStore, StoreStats};
use crate::models::WordNode;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

struct WordRecord {
    node: WordNode,
    seq: u64,
}

#[derive(Default)]
struct GraphState {
    words: HashMap<String, WordRecord>,
    outgoing: HashMap<String, Vec<String>>,
    incoming: HashMap<String, Vec<String>>,
    edges: HashSet<(String, String)>,
    next_seq: u64,
}

impl GraphState {
    fn neighbors(&self, word: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let empty = Vec::new();
        self.outgoing
            .get(word)
            .unwrap_or(&empty)
            .iter()
            .chain(self.incoming.get(word).unwrap_or(&empty))
            .filter(|neighbor| neighbor.as_str() != word && seen.insert(neighbor.as_str()))
            .cloned()
            .collect()
    }
}

/// `AssociationStore` held entirely in memory
#[derive(Default)]
pub struct MemoryAssociationStore {
    state: RwLock<GraphState>,
}

impl MemoryAssociationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from undirected word pairs, creating words in first-seen
    /// order and edges in both directions
    pub async fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let store = Self::new();
        for (a, b) in pairs {
            store.upsert_word(a).await?;
            store.upsert_word(b).await?;
            store.upsert_association(a, b).await?;
            store.upsert_association(b, a).await?;
        }
        Ok(store)
    }
}

#[async_trait]
impl AssociationStore for MemoryAssociationStore {
    async fn upsert_word(&self, word: &str) -> Result<WordNode> {
        let mut state = self.state.write().await;
        if let Some(record) = state.words.get(word) {
            return Ok(record.node.clone());
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        let node = WordNode {
            word: word.to_string(),
            created_at: chrono::Utc::now(),
        };
        state.words.insert(
            word.to_string(),
            WordRecord {
                node: node.clone(),
                seq,
            },
        );
        Ok(node)
    }

    async fn get_word(&self, word: &str) -> Result<Option<WordNode>> {
        let state = self.state.read().await;
        Ok(state.words.get(word).map(|record| record.node.clone()))
    }

    async fn upsert_association(&self, source: &str, target: &str) -> Result<bool> {
        if source == target {
            return Ok(false);
        }

        let mut state = self.state.write().await;
        if !state.words.contains_key(source) || !state.words.contains_key(target) {
            return Ok(false);
        }
        if !state
            .edges
            .insert((source.to_string(), target.to_string()))
        {
            return Ok(false);
        }

        state
            .outgoing
            .entry(source.to_string())
            .or_default()
            .push(target.to_string());
        state
            .incoming
            .entry(target.to_string())
            .or_default()
            .push(source.to_string());
        Ok(true)
    }

    async fn outgoing(&self, word: &str) -> Result<Vec<String>> {
        let state = self.state.read().await;
        Ok(state.outgoing.get(word).cloned().unwrap_or_default())
    }

    async fn incoming(&self, word: &str) -> Result<Vec<String>> {
        let state = self.state.read().await;
        Ok(state.incoming.get(word).cloned().unwrap_or_default())
    }

    async fn neighbors(&self, word: &str) -> Result<Vec<String>> {
        let state = self.state.read().await;
        Ok(state.neighbors(word))
    }

    async fn words_by_creation(&self, limit: usize) -> Result<Vec<String>> {
        let state = self.state.read().await;
        let mut records: Vec<&WordRecord> = state.words.values().collect();
        // Insertion sequence is creation order without clock skew
        records.sort_by_key(|record| record.seq);
        Ok(records
            .into_iter()
            .take(limit)
            .map(|record| record.node.word.clone())
            .collect())
    }

    /// Same traversal as `breadth_first_path`, run under a single read lock
    async fn shortest_path(
        &self,
        from: &str,
        to: &str,
        max_depth: usize,
    ) -> Result<Option<Vec<String>>> {
        let state = self.state.read().await;
        if !state.words.contains_key(from) || !state.words.contains_key(to) {
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
                let mut neighbors = state.neighbors(word);
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

    async fn stats(&self) -> Result<StoreStats> {
        let state = self.state.read().await;
        Ok(StoreStats {
            words: state.words.len(),
            associations: state.edges.len(),
        })
    }
}
