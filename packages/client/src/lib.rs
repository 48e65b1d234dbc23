/// Semantical Client - Exploration Engine
///
/// This crate drives the player's side of a puzzle: it keeps the explored
/// subgraph, expands nodes through a [`WordSource`], serializes graph
/// mutations, replays hints along the puzzle's hint path and detects the win.
///
/// # Features
///
/// - **Single-flight mutation**: at most one expansion is merged at a time
/// - **Explicit state container**: mutate through engine operations, read
///   through [`GraphSnapshot`] or the [`EngineEvent`] stream
/// - **Pluggable source**: [`ApiClient`] over HTTP or [`LocalSource`] in-process
///
/// # Example
///
/// ```ignore
/// use semantical_client::{ApiClient, ApiClientConfig, EngineConfig, ExplorationEngine};
/// use semantical_core::PuzzleMode;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let source = Arc::new(ApiClient::new(ApiClientConfig::from_env())?);
///     let engine = ExplorationEngine::new(source, EngineConfig::default())?;
///
///     let puzzle = engine.switch_mode(PuzzleMode::Unlimited, 1_709_251_200_000).await?;
///     engine.activate(&puzzle.start).await?;
///     println!("{:?}", engine.snapshot().await.nodes);
///     Ok(())
/// }
/// ```
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod source;
pub mod state;

pub use api::ApiClient;
pub use config::{ApiClientConfig, EngineConfig};
pub use engine::{ActivationOutcome, ExplorationEngine, HintOutcome};
pub use error::{ClientError, Result};
pub use events::EngineEvent;
pub use source::{LocalSource, WordSource};
pub use state::{ClientGraphState, GraphSnapshot, Link, MergeOutcome, NodeAnnotation};
