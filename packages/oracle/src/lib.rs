/// Semantical Oracle - Generative Word Associations
///
/// This crate provides the fallback source of word associations used when the
/// shared word graph has too few neighbors for a word. The oracle asks a language
/// model for a short JSON array of related words.
///
/// # Features
///
/// - **Trait seam**: [`AssociationOracle`] lets services and tests swap the backend
/// - **Prefilled completions**: the assistant turn starts with `[` so the model
///   continues a JSON array
/// - **Bounded requests**: every call carries a timeout (30s by default)
/// - **Offline mode**: [`DisabledOracle`] when no API key is configured
///
/// # Example
///
/// ```ignore
/// use semantical_oracle::{AnthropicOracle, AssociationOracle, OracleConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let oracle = AnthropicOracle::new(OracleConfig::from_env())?;
///     let words = oracle.associate("zephyr").await?;
///     println!("{:?}", words); // ["wind", "breeze", ...]
///     Ok(())
/// }
/// ```
pub mod config;
pub mod error;
pub mod oracle;

// Re-export main types
pub use config::OracleConfig;
pub use error::{OracleError, Result};
pub use oracle::{parse_word_array, AnthropicOracle, AssociationOracle, DisabledOracle};
