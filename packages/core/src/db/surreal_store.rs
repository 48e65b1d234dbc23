//! SurrealAssociationStore - AssociationStore on Embedded SurrealDB
//!
//! Persists the shared word graph in an embedded SurrealDB database (RocksDB
//! engine).
//!
//! # Schema
//!
//! - `word` table: record id `word:⟨normalized word⟩`, fields `word` and
//!   `created_at` (RFC 3339, microsecond precision, so string order is time order)
//! - `associated_with` relation table: `RELATE word:a->associated_with->word:b`,
//!   with a UNIQUE index on `(in, out)` so concurrent writers cannot duplicate
//!   an edge
//!
//! # Idempotency
//!
//! Writes check for an existing record before creating one. When two writers
//! race past the check, the record id (words) or the unique index (edges)
//! rejects the second write and the statement error is left in the response,
//! which is what MERGE semantics require.
//!
//! # Examples
//!
//! ```rust,no_run
//! use semantical_core::db::{AssociationStore, SurrealAssociationStore};
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = SurrealAssociationStore::new(PathBuf::from("./data/words.db")).await?;
//!     let neighbors = store.neighbors("human").await?;
//!     println!("{:?}", neighbors);
//!     Ok(())
//! }
//! ```

use super::association_store::{AssociationStore, StoreStats};
use super::error::StoreError;
use crate::models::WordNode;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use surrealdb::engine::local::{Db, RocksDb};
use surrealdb::sql::{Id, Thing};
use surrealdb::Surreal;

const WORD_TABLE: &str = "word";

/// Row shape of the `word` table
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SurrealWord {
    word: String,
    created_at: String,
}

impl From<SurrealWord> for WordNode {
    fn from(sw: SurrealWord) -> Self {
        WordNode {
            word: sw.word,
            created_at: DateTime::parse_from_rfc3339(&sw.created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CountRow {
    total: i64,
}

/// `AssociationStore` backed by embedded SurrealDB
pub struct SurrealAssociationStore {
    db: Arc<Surreal<Db>>,
}

impl SurrealAssociationStore {
    /// Open (or create) the store at `db_path`
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The parent directory cannot be created
    /// - RocksDB initialization fails
    /// - Schema definition fails
    pub async fn new(db_path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let db = Surreal::new::<RocksDb>(db_path.clone())
            .await
            .map_err(|e| StoreError::connection_failed(db_path.clone(), e))?;

        db.use_ns("semantical")
            .use_db("words")
            .await
            .map_err(|e| StoreError::connection_failed(db_path, e))?;

        let db = Arc::new(db);
        Self::initialize_schema(&db).await?;

        tracing::info!("Association store ready");
        Ok(Self { db })
    }

    /// Define tables and indexes (idempotent)
    async fn initialize_schema(db: &Surreal<Db>) -> Result<(), StoreError> {
        db.query(
            "
            DEFINE TABLE IF NOT EXISTS word SCHEMALESS;
            DEFINE INDEX IF NOT EXISTS word_created_at ON word FIELDS created_at;
            DEFINE TABLE IF NOT EXISTS associated_with SCHEMALESS TYPE RELATION;
            DEFINE INDEX IF NOT EXISTS associated_with_pair ON associated_with FIELDS in, out UNIQUE;
            ",
        )
        .await
        .map_err(|e| StoreError::initialization_failed(e.to_string()))?
        .check()
        .map_err(|e| StoreError::initialization_failed(e.to_string()))?;

        Ok(())
    }

    async fn association_exists(&self, source: &Thing, target: &Thing) -> Result<bool> {
        let mut response = self
            .db
            .query("SELECT VALUE id FROM associated_with WHERE in = $source AND out = $target;")
            .bind(("source", source.clone()))
            .bind(("target", target.clone()))
            .await
            .context("Failed to check for existing association")?;

        let existing: Vec<Thing> = response
            .take(0)
            .context("Failed to extract association check results")?;

        Ok(!existing.is_empty())
    }

    fn word_thing(word: &str) -> Thing {
        Thing::from((WORD_TABLE, Id::String(word.to_string())))
    }

    fn thing_word(thing: &Thing) -> Option<String> {
        match &thing.id {
            Id::String(word) => Some(word.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl AssociationStore for SurrealAssociationStore {
    async fn upsert_word(&self, word: &str) -> Result<WordNode> {
        if let Some(existing) = self.get_word(word).await? {
            return Ok(existing);
        }

        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        self.db
            .query("CREATE type::thing($table, $word) CONTENT { word: $word, created_at: $created_at };")
            .bind(("table", WORD_TABLE))
            .bind(("word", word.to_string()))
            .bind(("created_at", created_at))
            .await
            .context("Failed to create word")?;

        // Re-read so a concurrent creator's timestamp wins consistently
        self.get_word(word)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Word not found after create: {}", word))
    }

    async fn get_word(&self, word: &str) -> Result<Option<WordNode>> {
        let mut response = self
            .db
            .query("SELECT word, created_at FROM type::thing($table, $word);")
            .bind(("table", WORD_TABLE))
            .bind(("word", word.to_string()))
            .await
            .context("Failed to query word")?;

        let rows: Vec<SurrealWord> = response
            .take(0)
            .context("Failed to extract word lookup results")?;

        Ok(rows.into_iter().map(Into::into).next())
    }

    async fn upsert_association(&self, source: &str, target: &str) -> Result<bool> {
        if source == target {
            return Ok(false);
        }
        if self.get_word(source).await?.is_none() || self.get_word(target).await?.is_none() {
            return Ok(false);
        }

        let source_thing = Self::word_thing(source);
        let target_thing = Self::word_thing(target);

        // Check if association already exists (for idempotency)
        if self
            .association_exists(&source_thing, &target_thing)
            .await?
        {
            return Ok(false);
        }

        let relate = self
            .db
            .query("RELATE $source->associated_with->$target;")
            .bind(("source", source_thing.clone()))
            .bind(("target", target_thing.clone()))
            .await
            .context("Failed to create association")?
            .check();

        if let Err(e) = relate {
            // The unique (in, out) index rejects the loser of a concurrent insert
            if self.association_exists(&source_thing, &target_thing).await? {
                tracing::debug!(source, target, "Association created concurrently");
                return Ok(false);
            }
            return Err(anyhow::Error::new(e).context("Failed to create association"));
        }

        Ok(true)
    }

    async fn outgoing(&self, word: &str) -> Result<Vec<String>> {
        let mut response = self
            .db
            .query("SELECT out FROM associated_with WHERE in = $node;")
            .bind(("node", Self::word_thing(word)))
            .await
            .context("Failed to get outgoing associations")?;

        #[derive(Debug, Deserialize)]
        struct AssociationOut {
            out: Thing,
        }

        let rows: Vec<AssociationOut> = response
            .take(0)
            .context("Failed to extract outgoing associations from response")?;

        Ok(rows
            .iter()
            .filter_map(|row| Self::thing_word(&row.out))
            .collect())
    }

    async fn incoming(&self, word: &str) -> Result<Vec<String>> {
        let mut response = self
            .db
            .query("SELECT in FROM associated_with WHERE out = $node;")
            .bind(("node", Self::word_thing(word)))
            .await
            .context("Failed to get incoming associations")?;

        #[derive(Debug, Deserialize)]
        struct AssociationIn {
            #[serde(rename = "in")]
            in_field: Thing,
        }

        let rows: Vec<AssociationIn> = response
            .take(0)
            .context("Failed to extract incoming associations from response")?;

        Ok(rows
            .iter()
            .filter_map(|row| Self::thing_word(&row.in_field))
            .collect())
    }

    async fn words_by_creation(&self, limit: usize) -> Result<Vec<String>> {
        let mut response = self
            .db
            .query("SELECT word, created_at FROM word ORDER BY created_at ASC, word ASC LIMIT $limit;")
            .bind(("limit", limit as i64))
            .await
            .context("Failed to query word snapshot")?;

        let rows: Vec<SurrealWord> = response
            .take(0)
            .context("Failed to extract word snapshot")?;

        Ok(rows.into_iter().map(|row| row.word).collect())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let mut response = self
            .db
            .query(
                "
                SELECT count() AS total FROM word GROUP ALL;
                SELECT count() AS total FROM associated_with GROUP ALL;
                ",
            )
            .await
            .context("Failed to count graph")?;

        let words: Vec<CountRow> = response.take(0).context("Failed to extract word count")?;
        let associations: Vec<CountRow> = response
            .take(1)
            .context("Failed to extract association count")?;

        Ok(StoreStats {
            words: words.first().map(|row| row.total.max(0) as usize).unwrap_or(0),
            associations: associations
                .first()
                .map(|row| row.total.max(0) as usize)
                .unwrap_or(0),
        })
    }
}
