//! Semantical HTTP server
//!
//! Serves puzzles and word expansions as JSON to the browser front-end and to
//! `semantical-client`:
//!
//! - `puzzle_endpoints`: `/start.json`, `/bingo.json`
//! - `word_endpoints`: `/word.json`
//!
//! Handlers are stateless apart from the shared services in [`AppState`],
//! whose caches are process-wide.

use anyhow::{Context, Result};
use axum::{
    http::{header::HeaderValue, Method},
    Router,
};
use semantical_core::db::{AssociationStore, MemoryAssociationStore, SurrealAssociationStore};
use semantical_core::{ExpansionCache, PuzzleCache, PuzzleSelector, WordExpansionService};
use semantical_oracle::{AnthropicOracle, AssociationOracle, DisabledOracle};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
mod http_error;
mod puzzle_endpoints;
mod word_endpoints;

pub use config::{ServerConfig, StoreBackend};
pub use http_error::HttpError;
pub use puzzle_endpoints::{parse_date_seed, parse_seed};

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub expansion: Arc<WordExpansionService>,
    pub selector: Arc<PuzzleSelector>,
}

impl AppState {
    /// Wire both services to one store with fresh caches
    pub fn new(
        store: Arc<dyn AssociationStore>,
        oracle: Arc<dyn AssociationOracle>,
        config: &ServerConfig,
    ) -> Result<Self> {
        let expansion = WordExpansionService::new(
            store.clone(),
            oracle,
            Arc::new(ExpansionCache::new()),
            config.expansion.clone(),
        )?;
        let selector = PuzzleSelector::new(
            store,
            Arc::new(PuzzleCache::new()),
            config.selector.clone(),
        )?;

        Ok(Self {
            expansion: Arc::new(expansion),
            selector: Arc::new(selector),
        })
    }

    /// Open the configured store and oracle
    pub async fn from_config(config: &ServerConfig) -> Result<Self> {
        let store: Arc<dyn AssociationStore> = match config.store {
            StoreBackend::Surreal => {
                if let Some(parent) = config.db_path.parent() {
                    tokio::fs::create_dir_all(parent).await.with_context(|| {
                        format!("Failed to create database directory {}", parent.display())
                    })?;
                }
                tracing::info!("Opening word graph at {}", config.db_path.display());
                Arc::new(SurrealAssociationStore::new(config.db_path.clone()).await?)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory word graph; nothing will be persisted");
                Arc::new(MemoryAssociationStore::new())
            }
        };

        let oracle: Arc<dyn AssociationOracle> = if config.oracle.is_enabled() {
            tracing::info!(model = %config.oracle.model, "Association oracle enabled");
            Arc::new(AnthropicOracle::new(config.oracle.clone())?)
        } else {
            tracing::warn!("ANTHROPIC_API_KEY not set; expansions use the stored graph only");
            Arc::new(DisabledOracle)
        };

        Self::new(store, oracle, config)
    }
}

/// Build the application router from all endpoint modules
pub fn create_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .merge(puzzle_endpoints::routes(state.clone()))
        .merge(word_endpoints::routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// CORS for read-only GET endpoints
///
/// Restricted to `origin` when given, otherwise open to any origin.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods([Method::GET, Method::OPTIONS]);
    match origin {
        Some(origin) => {
            let origin = origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS_ALLOW_ORIGIN {origin:?}"))?;
            Ok(layer.allow_origin(origin))
        }
        None => Ok(layer.allow_origin(Any)),
    }
}

/// Bind and serve until the process exits
pub async fn start_server(config: ServerConfig) -> Result<()> {
    let state = AppState::from_config(&config).await?;
    let app = create_router(state, cors_layer(config.cors_allow_origin.as_deref())?);

    let listener = tokio::net::TcpListener::bind(config.address())
        .await
        .with_context(|| format!("Failed to bind {}", config.address()))?;

    tracing::info!("Listening on http://{}", config.address());
    axum::serve(listener, app).await?;

    Ok(())
}
