/// Error types for the client exploration engine
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Server returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Invalid word: {0:?}")]
    InvalidWord(String),

    #[error("Seed out of range: {0}")]
    InvalidSeed(i64),
}

impl ClientError {
    /// Whether re-activating the same node may succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ClientError::InvalidWord(_) | ClientError::InvalidSeed(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
