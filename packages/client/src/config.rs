/// Configuration for the exploration engine and the HTTP word source
use serde::{Deserialize, Serialize};

/// Upper bound for the HTTP request timeout
const MAX_TIMEOUT_SECS: u64 = 600;

/// Configuration for `ExplorationEngine`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Hints granted per puzzle
    pub hint_budget: u32,

    /// Hold the first graph mutation until the rendering surface reports ready
    pub gate_on_surface: bool,

    /// Buffered events per subscriber before the slowest one starts lagging
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hint_budget: 3,
            gate_on_surface: false,
            event_capacity: 256,
        }
    }
}

impl EngineConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.event_capacity == 0 {
            return Err("event_capacity must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Configuration for `ApiClient`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiClientConfig {
    /// Server origin, e.g. `http://127.0.0.1:4321`
    pub base_url: String,

    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:4321".to_string(),
            timeout_secs: 30,
        }
    }
}

impl ApiClientConfig {
    /// Defaults overridden by `SEMANTICAL_API_URL`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("SEMANTICAL_API_URL") {
            if !url.trim().is_empty() {
                config.base_url = url.trim().to_string();
            }
        }
        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            ));
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(format!("timeout_secs cannot exceed {}", MAX_TIMEOUT_SECS));
        }

        Ok(())
    }
}
