//! Association Oracle
//!
//! The oracle is the generative fallback used when the word graph has too few
//! neighbors for a word. It accepts one word and returns a small set of related
//! words. Callers treat every failure as "no candidates" (see `OracleError`).
//!
//! # Implementations
//!
//! - [`AnthropicOracle`] - Messages API over HTTP, prefilled with `[` so the
//!   completion continues a JSON array
//! - [`DisabledOracle`] - always fails with [`OracleError::Disabled`]; used when no
//!   API key is configured

use crate::config::{OracleConfig, ANTHROPIC_VERSION};
use crate::error::{OracleError, Result};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Generative `word -> related words` function
///
/// Returned words are raw model output; normalization and self-filtering are the
/// caller's responsibility.
#[async_trait]
pub trait AssociationOracle: Send + Sync {
    async fn associate(&self, word: &str) -> Result<Vec<String>>;
}

/// Oracle that never produces candidates
#[derive(Debug, Default, Clone)]
pub struct DisabledOracle;

#[async_trait]
impl AssociationOracle for DisabledOracle {
    async fn associate(&self, _word: &str) -> Result<Vec<String>> {
        Err(OracleError::Disabled)
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: String,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Oracle backed by the Anthropic Messages API
pub struct AnthropicOracle {
    client: Client,
    config: OracleConfig,
}

impl AnthropicOracle {
    /// Create a new oracle client
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Config`] if the config is invalid or has no API key,
    /// and [`OracleError::Network`] if the HTTP client cannot be built.
    pub fn new(config: OracleConfig) -> Result<Self> {
        config.validate().map_err(OracleError::Config)?;

        let Some(api_key) = config.api_key.as_deref() else {
            return Err(OracleError::Config("api_key is required".to_string()));
        };

        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|e| OracleError::Config(format!("invalid api_key: {e}")))?;
        key.set_sensitive(true);
        headers.insert("x-api-key", key);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OracleError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.base_url)
    }
}

#[async_trait]
impl AssociationOracle for AnthropicOracle {
    async fn associate(&self, word: &str) -> Result<Vec<String>> {
        let request = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system: self.config.instruction(),
            messages: vec![
                ChatMessage {
                    role: "user",
                    content: word,
                },
                // Prefill so the completion continues a JSON array
                ChatMessage {
                    role: "assistant",
                    content: "[",
                },
            ],
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout(self.config.timeout_secs)
                } else {
                    OracleError::from(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status { status, body });
        }

        let body: MessagesResponse = response.json().await?;
        let text = body
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| OracleError::Parse("response has no text block".to_string()))?;

        let mut words = parse_word_array(&format!("[{text}"))?;
        words.truncate(self.config.max_words);

        tracing::debug!("Oracle produced {} word(s) for '{}'", words.len(), word);
        Ok(words)
    }
}

/// Parse the first JSON array of strings found in `raw`
///
/// Trailing prose after the closing bracket is ignored, non-string entries are
/// skipped and duplicates are removed while keeping first-seen order.
pub fn parse_word_array(raw: &str) -> Result<Vec<String>> {
    let start = raw
        .find('[')
        .ok_or_else(|| OracleError::Parse(format!("no JSON array in {raw:?}")))?;
    let end = raw[start..]
        .find(']')
        .map(|offset| start + offset)
        .ok_or_else(|| OracleError::Parse(format!("unterminated JSON array in {raw:?}")))?;

    let values: Vec<serde_json::Value> = serde_json::from_str(&raw[start..=end])
        .map_err(|e| OracleError::Parse(e.to_string()))?;

    let mut words: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        if let serde_json::Value::String(word) = value {
            if !words.contains(&word) {
                words.push(word);
            }
        }
    }

    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_array() {
        let words = parse_word_array(r#"["wind", "breeze", "gust"]"#).unwrap();
        assert_eq!(words, vec!["wind", "breeze", "gust"]);
    }

    #[test]
    fn test_parse_ignores_trailing_prose() {
        let words =
            parse_word_array("[\"ocean\", \"wave\"]\n\nThese words relate to the sea.").unwrap();
        assert_eq!(words, vec!["ocean", "wave"]);
    }

    #[test]
    fn test_parse_skips_non_strings_and_duplicates() {
        let words = parse_word_array(r#"["cat", 3, null, "cat", "kitten"]"#).unwrap();
        assert_eq!(words, vec!["cat", "kitten"]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_word_array("I cannot help with that"),
            Err(OracleError::Parse(_))
        ));
        assert!(matches!(
            parse_word_array("[\"open\", \"ended\""),
            Err(OracleError::Parse(_))
        ));
        assert!(matches!(
            parse_word_array("[wind, breeze]"),
            Err(OracleError::Parse(_))
        ));
    }

    #[test]
    fn test_anthropic_oracle_requires_api_key() {
        let result = AnthropicOracle::new(OracleConfig::default());
        assert!(matches!(result, Err(OracleError::Config(_))));
    }

    #[test]
    fn test_anthropic_oracle_endpoint() {
        let oracle = AnthropicOracle::new(OracleConfig {
            api_key: Some("sk-test".to_string()),
            base_url: "http://localhost:9999".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(oracle.endpoint(), "http://localhost:9999/v1/messages");
    }

    #[tokio::test]
    async fn test_disabled_oracle_fails() {
        let result = DisabledOracle.associate("zephyr").await;
        assert!(matches!(result, Err(OracleError::Disabled)));
    }
}
