//! Word Graph Data Structures
//!
//! This module defines the persistent side of the associative word graph:
//!
//! - `WordNode` - one normalized word, created on first insertion
//! - `AssociationEdge` - directed "source is associated with target" pair
//!
//! # Identity
//!
//! A word's identity is its normalized form: trimmed, lowercased, underscores
//! replaced with spaces and inner whitespace collapsed. Every store lookup and
//! every client-side node key goes through [`normalize_word`], so two spellings
//! that normalize equally are the same node.
//!
//! # Examples
//!
//! ```rust
//! use semantical_core::models::{normalize_word, WordNode};
//!
//! assert_eq!(normalize_word("Ice_Cream"), "ice cream");
//!
//! let node = WordNode::new("  Zephyr ");
//! assert_eq!(node.word, "zephyr");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for word input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WordError {
    #[error("Word is empty after normalization: {0:?}")]
    Empty(String),
}

/// Normalize a raw word into its node identity
///
/// Lowercases, replaces `_` with a space, trims and collapses runs of whitespace.
pub fn normalize_word(raw: &str) -> String {
    raw.replace('_', " ")
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalize and reject words that end up empty
pub fn validate_word(raw: &str) -> Result<String, WordError> {
    let word = normalize_word(raw);
    if word.is_empty() {
        return Err(WordError::Empty(raw.to_string()));
    }
    Ok(word)
}

/// A node of the associative word graph
///
/// # Fields
///
/// - `word`: normalized word, the node's identity
/// - `created_at`: first insertion time, used for stable snapshot ordering
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WordNode {
    pub word: String,
    pub created_at: DateTime<Utc>,
}

impl WordNode {
    /// Create a node stamped with the current time; `raw` is normalized
    pub fn new(raw: &str) -> Self {
        Self {
            word: normalize_word(raw),
            created_at: Utc::now(),
        }
    }
}

/// Directed association between two normalized words
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct AssociationEdge {
    pub source: String,
    pub target: String,
}

impl AssociationEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// The same pair pointing the other way
    pub fn reversed(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
        }
    }
}
