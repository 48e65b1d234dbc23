/// Server configuration read from the environment
use anyhow::{anyhow, Context, Result};
use semantical_core::{ExpansionConfig, SelectorConfig};
use semantical_oracle::OracleConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 4321;
const DEFAULT_BIND: &str = "127.0.0.1";

/// Which `AssociationStore` backs the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Embedded SurrealDB on disk
    Surreal,
    /// Process-local graph, lost on exit
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "surreal" | "surrealdb" => Ok(Self::Surreal),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow!(
                "unknown SEMANTICAL_STORE {other:?} (expected \"surreal\" or \"memory\")"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub store: StoreBackend,
    /// Single allowed browser origin; any origin when unset
    pub cors_allow_origin: Option<String>,
    pub expansion: ExpansionConfig,
    pub selector: SelectorConfig,
    pub oracle: OracleConfig,
}

impl ServerConfig {
    /// Defaults with the database under `home`
    pub fn with_home(home: PathBuf) -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            db_path: home.join(".semantical").join("database").join("words.db"),
            store: StoreBackend::Surreal,
            cors_allow_origin: None,
            expansion: ExpansionConfig::default(),
            selector: SelectorConfig::default(),
            oracle: OracleConfig::default(),
        }
    }

    /// Build the config from the environment
    ///
    /// - `SEMANTICAL_PORT` (default 4321)
    /// - `SEMANTICAL_BIND` (default `127.0.0.1`)
    /// - `SEMANTICAL_DB_PATH` (default `~/.semantical/database/words.db`)
    /// - `SEMANTICAL_STORE`: `surreal` (default) or `memory`
    /// - `CORS_ALLOW_ORIGIN`
    /// - oracle variables, see [`OracleConfig::from_env`]
    pub fn from_env() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Failed to get home directory"))?;
        let mut config = Self::with_home(home);

        if let Some(port) = non_empty_var("SEMANTICAL_PORT") {
            config.port = port
                .parse()
                .with_context(|| format!("invalid SEMANTICAL_PORT {port:?}"))?;
        }
        if let Some(bind) = non_empty_var("SEMANTICAL_BIND") {
            config.bind = bind;
        }
        if let Some(path) = non_empty_var("SEMANTICAL_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(store) = non_empty_var("SEMANTICAL_STORE") {
            config.store = store.parse()?;
        }
        config.cors_allow_origin = non_empty_var("CORS_ALLOW_ORIGIN");
        config.oracle = OracleConfig::from_env();

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bind.trim().is_empty() {
            return Err(anyhow!("bind address must not be empty"));
        }
        self.expansion.validate().map_err(|e| anyhow!(e))?;
        self.selector.validate().map_err(|e| anyhow!(e))?;
        self.oracle.validate().map_err(|e| anyhow!(e))?;
        Ok(())
    }

    /// `bind:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
