//! Semantical server binary
//!
//! ```bash
//! # Defaults: 127.0.0.1:4321, ~/.semantical/database/words.db
//! cargo run --bin semantical-server
//!
//! # Throwaway graph on another port
//! SEMANTICAL_STORE=memory SEMANTICAL_PORT=8080 cargo run --bin semantical-server
//! ```
//!
//! See [`semantical_server::ServerConfig::from_env`] for every variable.
//! `RUST_LOG` controls log output (default `info`).

use semantical_server::{start_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        address = %config.address(),
        store = ?config.store,
        "Starting Semantical server"
    );

    start_server(config).await
}
