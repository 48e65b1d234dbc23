//! Store Error Types
//!
//! This module defines error types for opening the association store. Failures
//! here happen at process start and are fatal; per-query failures are reported
//! through `anyhow::Result` with context.

use std::path::PathBuf;
use thiserror::Error;

/// Association store initialization errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the embedded database
    #[error("Failed to open association store at {path}: {source}")]
    ConnectionFailed {
        path: PathBuf,
        source: surrealdb::Error,
    },

    /// Failed to define tables and indexes
    #[error("Failed to initialize association store schema: {0}")]
    InitializationFailed(String),

    /// Failed to create parent directory
    #[error("Failed to create parent directory for association store: {0}")]
    DirectoryCreationFailed(#[from] std::io::Error),
}

impl StoreError {
    /// Create a connection failed error
    pub fn connection_failed(path: PathBuf, source: surrealdb::Error) -> Self {
        Self::ConnectionFailed { path, source }
    }

    /// Create an initialization failed error
    pub fn initialization_failed(msg: impl Into<String>) -> Self {
        Self::InitializationFailed(msg.into())
    }
}
