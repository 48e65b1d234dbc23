//! Client Graph State
//!
//! The explored subgraph for one puzzle instance. Only `ExplorationEngine`
//! mutates it; everything else reads a [`GraphSnapshot`].
//!
//! # Invariants
//!
//! - `nodes` and `links` only grow within one puzzle instance
//! - `found` is a subset of the puzzle's goals, in discovery order
//! - `hint_pointer` never decreases
//! - `hints_left` plus the hints in flight never exceeds the budget
//! - `won` flips to `true` at most once

use semantical_core::models::{normalize_word, PuzzleSpec};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Directed link `(activated word, neighbor)` drawn by the renderer
pub type Link = (String, String);

/// Transient per-node UI flags, keyed by normalized word
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAnnotation {
    /// Expanded successfully at least once
    pub visited: bool,
    /// An activation is in flight
    pub expanding: bool,
    /// The last activation failed; the node may be re-activated
    pub errored: bool,
}

/// Mutable state of one puzzle instance
#[derive(Debug, Clone, Default)]
pub struct ClientGraphState {
    puzzle: Option<PuzzleSpec>,
    goals: Vec<String>,
    nodes: Vec<String>,
    node_set: HashSet<String>,
    links: Vec<Link>,
    link_set: HashSet<Link>,
    found: Vec<String>,
    current_word: Option<String>,
    hint_pointer: usize,
    hints_left: u32,
    /// Hint-path indices reserved by activations still in flight
    hints_in_flight: HashSet<usize>,
    clicks: u32,
    won: bool,
}

/// Result of merging one expansion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Words that were not yet in `nodes`
    pub added: Vec<String>,
    /// Goals discovered by this merge
    pub newly_found: Vec<String>,
    /// True only for the merge that completed the puzzle
    pub won_now: bool,
}

impl ClientGraphState {
    /// Fresh state seeded with the puzzle's start word
    pub fn new(puzzle: PuzzleSpec, hint_budget: u32) -> Self {
        let goals = puzzle.goal_words();
        let mut state = Self {
            goals,
            hints_left: hint_budget,
            ..Self::default()
        };
        state.insert_node(&puzzle.start);
        state.puzzle = Some(puzzle);
        state
    }

    /// Empty state with no puzzle loaded
    pub fn empty(hint_budget: u32) -> Self {
        Self {
            hints_left: hint_budget,
            ..Self::default()
        }
    }

    pub fn puzzle(&self) -> Option<&PuzzleSpec> {
        self.puzzle.as_ref()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.node_set.contains(word)
    }

    pub fn is_goal(&self, word: &str) -> bool {
        self.goals.iter().any(|goal| goal == word)
    }

    pub fn hints_left(&self) -> u32 {
        self.hints_left
    }

    pub fn hint_pointer(&self) -> usize {
        self.hint_pointer
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    /// Record the word an activation is working on
    pub fn set_current_word(&mut self, word: &str) {
        self.current_word = Some(word.to_string());
    }

    /// Merge the expansion of `word` into the graph
    ///
    /// Adds `word` and every neighbor to `nodes`, a link from `word` to each
    /// neighbor, records discovered goals and evaluates the win condition.
    pub fn merge_expansion(&mut self, word: &str, neighbors: &[String]) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();
        self.insert_node(word);

        for raw in neighbors {
            let neighbor = normalize_word(raw);
            if neighbor.is_empty() || neighbor == word {
                continue;
            }

            if self.insert_node(&neighbor) {
                outcome.added.push(neighbor.clone());
            }

            let link = (word.to_string(), neighbor.clone());
            if self.link_set.insert(link.clone()) {
                self.links.push(link);
            }

            if self.is_goal(&neighbor) && !self.found.contains(&neighbor) {
                self.found.push(neighbor.clone());
                outcome.newly_found.push(neighbor);
            }
        }

        if !self.won {
            self.clicks += 1;
            if !self.goals.is_empty() && self.found.len() == self.goals.len() {
                self.won = true;
                outcome.won_now = true;
            }
        }

        outcome
    }

    /// First hint-path index after the pointer whose word is on screen, not
    /// yet expanded and not already reserved by another hint
    pub fn next_hint(&self, annotations: &HashMap<String, NodeAnnotation>) -> Option<(usize, String)> {
        let path = &self.puzzle.as_ref()?.hint_path;
        path.iter()
            .enumerate()
            .skip(self.hint_pointer + 1)
            .find(|(index, word)| {
                !self.hints_in_flight.contains(index)
                    && self.contains(word)
                    && !annotations.get(word.as_str()).is_some_and(|a| a.visited)
            })
            .map(|(index, word)| (index, word.clone()))
    }

    /// Take one hint from the budget for the activation at `index`
    ///
    /// Returns `false` without changing anything when the budget is spent.
    pub fn reserve_hint(&mut self, index: usize) -> bool {
        if self.hints_left == 0 {
            return false;
        }
        self.hints_left -= 1;
        self.hints_in_flight.insert(index);
        true
    }

    /// Settle a reserved hint whose activation merged; returns hints left
    pub fn consume_hint(&mut self, index: usize) -> u32 {
        self.hints_in_flight.remove(&index);
        self.hint_pointer = self.hint_pointer.max(index);
        self.hints_left
    }

    /// Return a reserved hint to the budget after a failed activation
    pub fn refund_hint(&mut self, index: usize) {
        if self.hints_in_flight.remove(&index) {
            self.hints_left += 1;
        }
    }

    pub fn snapshot(&self, annotations: &HashMap<String, NodeAnnotation>) -> GraphSnapshot {
        GraphSnapshot {
            puzzle: self.puzzle.clone(),
            nodes: self.nodes.clone(),
            links: self.links.clone(),
            found: self.found.clone(),
            current_word: self.current_word.clone(),
            hint_pointer: self.hint_pointer,
            hints_left: self.hints_left,
            clicks: self.clicks,
            won: self.won,
            annotations: annotations.clone(),
        }
    }

    fn insert_node(&mut self, word: &str) -> bool {
        if self.node_set.insert(word.to_string()) {
            self.nodes.push(word.to_string());
            true
        } else {
            false
        }
    }
}

/// Read-only copy of the engine state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    pub puzzle: Option<PuzzleSpec>,
    pub nodes: Vec<String>,
    pub links: Vec<Link>,
    pub found: Vec<String>,
    pub current_word: Option<String>,
    pub hint_pointer: usize,
    pub hints_left: u32,
    pub clicks: u32,
    pub won: bool,
    pub annotations: HashMap<String, NodeAnnotation>,
}
