/// Configuration for the association oracle
use serde::{Deserialize, Serialize};

/// Upper bound on completion size; the oracle only ever returns a handful of words
const MAX_SUPPORTED_TOKENS: u32 = 4096;

/// Anthropic Messages API version header value
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Configuration for the Messages-API backed oracle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// API key; `None` means the oracle runs disabled
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Base URL of the Messages API (no trailing slash)
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Maximum tokens the completion may use
    pub max_tokens: u32,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Fewest words the prompt asks for
    pub min_words: usize,

    /// Most words the prompt asks for (extra words are dropped)
    pub max_words: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-haiku-20240307".to_string(),
            max_tokens: 4096,
            timeout_secs: 30,
            min_words: 3,
            max_words: 5,
        }
    }
}

impl OracleConfig {
    /// Build a config from the environment, falling back to defaults
    ///
    /// - `ANTHROPIC_API_KEY`: API key (oracle disabled when unset or empty)
    /// - `SEMANTICAL_ORACLE_MODEL`: model override
    /// - `SEMANTICAL_ORACLE_URL`: base URL override (useful for proxies and tests)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.api_key = std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        if let Ok(model) = std::env::var("SEMANTICAL_ORACLE_MODEL") {
            if !model.trim().is_empty() {
                config.model = model;
            }
        }

        if let Ok(url) = std::env::var("SEMANTICAL_ORACLE_URL") {
            if !url.trim().is_empty() {
                config.base_url = url.trim_end_matches('/').to_string();
            }
        }

        config
    }

    /// Whether an API key is present
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url cannot be empty".to_string());
        }

        if self.model.is_empty() {
            return Err("model cannot be empty".to_string());
        }

        if self.max_tokens == 0 || self.max_tokens > MAX_SUPPORTED_TOKENS {
            return Err(format!(
                "max_tokens must be between 1 and {}",
                MAX_SUPPORTED_TOKENS
            ));
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if self.min_words == 0 || self.min_words > self.max_words {
            return Err(format!(
                "word range {}..={} is invalid",
                self.min_words, self.max_words
            ));
        }

        Ok(())
    }

    /// Prompt sent as the first user turn
    pub fn instruction(&self) -> String {
        format!(
            "You produce dictionary words that are semantically related to the provided word. \
             The output should be a json array of {}-{} words.",
            self.min_words, self.max_words
        )
    }
}
