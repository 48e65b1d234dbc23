//! Store Layer
//!
//! This module handles all interactions with the shared associative word graph:
//!
//! - The `AssociationStore` trait (point lookups, neighbor queries, shortest paths,
//!   idempotent upserts)
//! - `SurrealAssociationStore` - embedded SurrealDB (RocksDB engine), the
//!   production backend
//! - `MemoryAssociationStore` - process-local backend for tests and throwaway runs
//!
//! # Architecture
//!
//! Edges are stored directed (`source -> target`) but every distance and path
//! question treats the graph as undirected. Words are keyed by their normalized
//! form, so the record id is the node identity.

mod association_store;
mod error;
mod memory_store;
mod surreal_store;

pub use association_store::{breadth_first_path, AssociationStore, StoreStats};
pub use error::StoreError;
pub use memory_store::MemoryAssociationStore;
pub use surreal_store::SurrealAssociationStore;
