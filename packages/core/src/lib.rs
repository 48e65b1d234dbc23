//! Semantical Core Word-Graph Layer
//!
//! This crate provides the shared association graph, the expansion service
//! that grows it on demand, and the selector that turns it into puzzles.
//!
//! # Architecture
//!
//! - **Association store**: a persistent directed graph of normalized words;
//!   distances and paths treat it as undirected
//! - **Grow on read**: sparse words are expanded through the association oracle
//!   and the results are written back, so the graph densifies with use
//! - **Deterministic selection**: the same `(mode, seed)` always yields the same
//!   puzzle over the same graph
//!
//! # Modules
//!
//! - [`models`] - Words, edges, puzzles and JSON wire types
//! - [`db`] - `AssociationStore` trait with SurrealDB and in-memory backends
//! - [`services`] - Expansion service, puzzle selector and caches
//! - [`config`] - Service configuration

pub mod config;
pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::{DistanceRange, ExpansionConfig, SelectorConfig};
pub use models::*;
pub use services::*;
