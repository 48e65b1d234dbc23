//! HTTP error handling for the puzzle server
//!
//! Every endpoint answers failures with the same JSON body so the front-end
//! can branch on `code` instead of parsing messages.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use semantical_core::GraphServiceError;
use serde::{Deserialize, Serialize};

/// JSON error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    /// Optional detailed error information for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HttpError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: Some(details.into()),
        }
    }

    /// Shorthand for a 400 response
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(message, "INVALID_INPUT")
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "INVALID_INPUT" => StatusCode::BAD_REQUEST,
            "STORE_UNAVAILABLE" => StatusCode::SERVICE_UNAVAILABLE,
            "TIMEOUT" => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = %self.code, "Request failed: {}", self.message);
        }
        (status, Json(self)).into_response()
    }
}

impl From<GraphServiceError> for HttpError {
    fn from(err: GraphServiceError) -> Self {
        match err {
            GraphServiceError::InvalidWord(e) => HttpError::invalid_input(e.to_string()),
            GraphServiceError::StoreUnavailable { context } => HttpError::with_details(
                "Word graph is unavailable",
                "STORE_UNAVAILABLE",
                context,
            ),
            GraphServiceError::Timeout { .. } => HttpError::new(err.to_string(), "TIMEOUT"),
            GraphServiceError::SelectionExhausted { .. } => {
                HttpError::new(err.to_string(), "SELECTION_EXHAUSTED")
            }
            GraphServiceError::Configuration(message) => {
                HttpError::new(message, "CONFIGURATION_ERROR")
            }
        }
    }
}
