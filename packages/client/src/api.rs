//! HTTP client for the Semantical JSON endpoints.
//!
//! `GET word.json`, `start.json` and `bingo.json` with a per-request timeout.
//! Non-2xx responses and bodies that do not match the wire types become
//! [`ClientError`]s, which the engine treats as activation failures.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use semantical_core::models::{
    day_bucket, BingoResponse, PuzzleMode, PuzzleSpec, StartResponse, WordsResponse,
};
use serde::de::DeserializeOwned;

use crate::config::ApiClientConfig;
use crate::error::{ClientError, Result};
use crate::source::WordSource;

/// `WordSource` speaking HTTP to a Semantical server
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Build a client from configuration.
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        config.validate().map_err(ClientError::Transport)?;

        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /word.json?word=…`
    pub async fn word(&self, word: &str) -> Result<WordsResponse> {
        self.get_json("word.json", &[("word", word.to_string())]).await
    }

    /// `GET /start.json` for a daily or unlimited puzzle.
    ///
    /// Daily puzzles are requested by calendar date, unlimited ones by seed.
    pub async fn start(&self, mode: PuzzleMode, seed: i64) -> Result<StartResponse> {
        let query = match mode {
            PuzzleMode::Daily => {
                let day = DateTime::from_timestamp_millis(day_bucket(seed))
                    .ok_or(ClientError::InvalidSeed(seed))?;
                ("date", day.date_naive().to_string())
            }
            PuzzleMode::Unlimited | PuzzleMode::Bingo => ("seed", seed.to_string()),
        };
        self.get_json("start.json", &[query]).await
    }

    /// `GET /bingo.json?seed=…`
    pub async fn bingo(&self, seed: i64) -> Result<BingoResponse> {
        self.get_json("bingo.json", &[("seed", seed.to_string())]).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(format!("{path}: {e}")))
    }

    async fn single(&self, mode: PuzzleMode, seed: i64) -> Result<PuzzleSpec> {
        self.start(mode, seed)
            .await?
            .into_puzzle(mode, seed)
            .ok_or_else(|| ClientError::Decode("start.json must name a start and a goal word".to_string()))
    }

    fn classify(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout.as_secs())
        } else {
            err.into()
        }
    }
}

#[async_trait]
impl WordSource for ApiClient {
    async fn related_words(&self, word: &str) -> Result<Vec<String>> {
        Ok(self.word(word).await?.words)
    }

    async fn puzzle(&self, mode: PuzzleMode, seed: i64) -> Result<PuzzleSpec> {
        match mode {
            PuzzleMode::Bingo => Ok(self.bingo(seed).await?.into_puzzle(seed)),
            PuzzleMode::Daily => self.single(mode, day_bucket(seed)).await,
            PuzzleMode::Unlimited => self.single(mode, seed).await,
        }
    }
}
