/// Error types for the association oracle
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Oracle is disabled - no API key configured")]
    Disabled,

    #[error("Oracle request failed: {0}")]
    Network(String),

    #[error("Oracle returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Oracle response could not be parsed: {0}")]
    Parse(String),

    #[error("Oracle request timed out after {0}s")]
    Timeout(u64),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            OracleError::Parse(err.to_string())
        } else {
            OracleError::Network(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, OracleError>;
