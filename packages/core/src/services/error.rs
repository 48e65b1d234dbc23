//! Service Layer Error Types
//!
//! This module defines error types for the expansion and puzzle-selection
//! services. Oracle failures never appear here: they are recovered inside the
//! expansion service as an empty candidate set.

use crate::models::WordError;
use std::time::Duration;
use thiserror::Error;

/// Service operation errors
#[derive(Error, Debug)]
pub enum GraphServiceError {
    /// The association store could not be reached or failed a query
    #[error("Association store unavailable: {context}")]
    StoreUnavailable { context: String },

    /// A store call exceeded its time budget
    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },

    /// Input word is unusable
    #[error("Invalid word: {0}")]
    InvalidWord(#[from] WordError),

    /// Distance-constrained search found nothing acceptable
    #[error("Puzzle selection exhausted after {attempts} attempt(s)")]
    SelectionExhausted { attempts: usize },

    /// Service configuration rejected
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl GraphServiceError {
    /// Create a store unavailable error
    pub fn store_unavailable(context: impl Into<String>) -> Self {
        Self::StoreUnavailable {
            context: context.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            secs: after.as_secs(),
        }
    }

    /// Create a selection exhausted error
    pub fn selection_exhausted(attempts: usize) -> Self {
        Self::SelectionExhausted { attempts }
    }

    /// Create a configuration error
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Run a store future under a time budget, mapping failures to service errors
pub(crate) async fn bounded_store_call<T, F>(
    operation: &str,
    budget: Duration,
    call: F,
) -> Result<T, GraphServiceError>
where
    F: std::future::Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(budget, call).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(GraphServiceError::store_unavailable(format!(
            "{operation}: {e:#}"
        ))),
        Err(_) => Err(GraphServiceError::timeout(operation, budget)),
    }
}
