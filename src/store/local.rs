//! Local vector store on SQLite
//!
//! Records live in `store.db` inside the persistence directory. Similarity
//! search is an exact cosine scan over the records that pass the metadata
//! filter.

use super::{
    decode_vector, encode_vector, MetadataFilter, PersistOutcome, Record, SearchResult,
    StoreDescription, StoredRecord, VectorStore,
};
use crate::config::StoreBackend;
use crate::embed::cosine_similarity;
use crate::error::Result;
use crate::metadata::{Metadata, SOURCE_KEY};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of the database inside the persistence directory
pub const STORE_FILE_NAME: &str = "store.db";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    document TEXT NOT NULL,
    embedding BLOB NOT NULL,
    metadata_json TEXT NOT NULL,
    source TEXT
);

CREATE INDEX IF NOT EXISTS idx_records_source ON records(source);
"#;

#[derive(Debug, FromRow)]
struct RecordRow {
    id: String,
    document: String,
    embedding: Vec<u8>,
    metadata_json: String,
}

impl RecordRow {
    fn metadata(&self) -> Result<Metadata> {
        Ok(serde_json::from_str(&self.metadata_json)?)
    }
}

/// SQLite-backed vector store
#[derive(Clone)]
pub struct LocalStore {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl LocalStore {
    /// Open (creating if needed) the store in `dir`
    pub async fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let db_path = dir.join(STORE_FILE_NAME);

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        debug!("Opening local vector store at {:?}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::raw_sql(SCHEMA_SQL).execute(&pool).await?;

        Ok(Self { pool, db_path })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn candidate_rows(&self, filter: Option<&MetadataFilter>) -> Result<Vec<RecordRow>> {
        let rows = match filter.and_then(|f| f.source_value()) {
            Some(source) => {
                sqlx::query_as::<_, RecordRow>(
                    "SELECT id, document, embedding, metadata_json FROM records WHERE source = ? ORDER BY seq",
                )
                .bind(source)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, RecordRow>(
                    "SELECT id, document, embedding, metadata_json FROM records ORDER BY seq",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }
}

#[async_trait]
impl VectorStore for LocalStore {
    async fn get(&self, id: &str) -> Result<Option<StoredRecord>> {
        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT id, document, embedding, metadata_json FROM records WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let metadata = row.metadata()?;
                Ok(Some(StoredRecord {
                    id: row.id,
                    text: row.document,
                    metadata,
                }))
            }
            None => Ok(None),
        }
    }

    async fn add(&self, record: Record) -> Result<()> {
        let metadata_json = serde_json::to_string(&record.metadata)?;
        let source = record
            .metadata
            .get(SOURCE_KEY)
            .and_then(|v| v.as_str())
            .map(str::to_string);

        sqlx::query(
            r#"
            INSERT INTO records (id, document, embedding, metadata_json, source)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                document = excluded.document,
                embedding = excluded.embedding,
                metadata_json = excluded.metadata_json,
                source = excluded.source
            "#,
        )
        .bind(&record.id)
        .bind(&record.text)
        .bind(encode_vector(&record.embedding))
        .bind(&metadata_json)
        .bind(&source)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn similarity_search(
        &self,
        query: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>> {
        let rows = self.candidate_rows(filter).await?;
        debug!("Scoring {} candidate records", rows.len());

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let metadata = row.metadata()?;
            if let Some(f) = filter {
                if !f.matches(&metadata) {
                    continue;
                }
            }

            let embedding = decode_vector(&row.embedding)?;
            results.push(SearchResult {
                score: cosine_similarity(query, &embedding),
                id: row.id,
                text: row.document,
                metadata,
            });
        }

        // Stable sort keeps insertion order for equal scores
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);

        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM records")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    async fn source_counts(&self) -> Result<BTreeMap<String, usize>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT source, COUNT(*) FROM records WHERE source IS NOT NULL GROUP BY source",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(source, count)| (source, count as usize))
            .collect())
    }

    async fn persist(&self) -> Result<PersistOutcome> {
        sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&self.pool)
            .await?;
        info!("Checkpointed local store at {:?}", self.db_path);
        Ok(PersistOutcome::Persisted)
    }

    fn describe(&self) -> StoreDescription {
        StoreDescription {
            backend: StoreBackend::Local,
            location: self.db_path.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{source_metadata, MetadataValue};
    use tempfile::TempDir;

    async fn setup_store() -> (LocalStore, TempDir) {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::open(&tmp.path().join("vector_store")).await.unwrap();
        (store, tmp)
    }

    fn record(id: &str, text: &str, embedding: Vec<f32>, source: &str) -> Record {
        Record {
            id: id.to_string(),
            text: text.to_string(),
            embedding,
            metadata: source_metadata(source),
        }
    }

    #[tokio::test]
    async fn test_open_creates_directory() {
        let (store, _tmp) = setup_store().await;
        assert!(store.db_path().exists());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let (store, _tmp) = setup_store().await;

        let mut metadata = Metadata::new();
        metadata.insert("employees".to_string(), MetadataValue::Int(12));
        metadata.insert("sectors".to_string(), MetadataValue::from("[\"energy\"]"));
        store
            .add(Record {
                id: "COMPANY_PROFILE".to_string(),
                text: "We build turbines.".to_string(),
                embedding: vec![1.0, 0.0],
                metadata: metadata.clone(),
            })
            .await
            .unwrap();

        let fetched = store.get("COMPANY_PROFILE").await.unwrap().unwrap();
        assert_eq!(fetched.text, "We build turbines.");
        assert_eq!(fetched.metadata, metadata);
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_same_id_replaces() {
        let (store, _tmp) = setup_store().await;
        store.add(record("r1", "old", vec![1.0], "a.pdf")).await.unwrap();
        store.add(record("r1", "new", vec![1.0], "a.pdf")).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.get("r1").await.unwrap().unwrap().text, "new");
    }

    #[tokio::test]
    async fn test_search_ranks_by_cosine_and_filters() {
        let (store, _tmp) = setup_store().await;
        store.add(record("a1", "far", vec![0.0, 1.0], "a.pdf")).await.unwrap();
        store.add(record("a2", "near", vec![1.0, 0.1], "a.pdf")).await.unwrap();
        store.add(record("b1", "other", vec![1.0, 0.0], "b.pdf")).await.unwrap();

        let filter = MetadataFilter::source("a.pdf");
        let results = store
            .similarity_search(&[1.0, 0.0], 5, Some(&filter))
            .await
            .unwrap();

        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a2", "a1"]);
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_search_respects_k() {
        let (store, _tmp) = setup_store().await;
        for i in 0..8 {
            store
                .add(record(&format!("c{}", i), "chunk", vec![1.0, i as f32], "c.pdf"))
                .await
                .unwrap();
        }

        let filter = MetadataFilter::source("c.pdf");
        let results = store
            .similarity_search(&[1.0, 0.0], 5, Some(&filter))
            .await
            .unwrap();
        assert_eq!(results.len(), 5);
        assert_eq!(results[0].id, "c0");
    }

    #[tokio::test]
    async fn test_search_unknown_source_is_empty() {
        let (store, _tmp) = setup_store().await;
        store.add(record("a1", "text", vec![1.0], "a.pdf")).await.unwrap();

        let filter = MetadataFilter::source("missing.pdf");
        let results = store.similarity_search(&[1.0], 5, Some(&filter)).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_source_counts_and_persist() {
        let (store, _tmp) = setup_store().await;
        store.add(record("a1", "x", vec![1.0], "a.pdf")).await.unwrap();
        store.add(record("a2", "y", vec![1.0], "a.pdf")).await.unwrap();
        store.add(record("b1", "z", vec![1.0], "b.pdf")).await.unwrap();
        store
            .add(Record {
                id: "COMPANY_PROFILE".to_string(),
                text: "profile".to_string(),
                embedding: vec![1.0],
                metadata: Metadata::new(),
            })
            .await
            .unwrap();

        let counts = store.source_counts().await.unwrap();
        assert_eq!(counts.get("a.pdf"), Some(&2));
        assert_eq!(counts.get("b.pdf"), Some(&1));
        assert_eq!(counts.len(), 2);
        assert_eq!(store.count().await.unwrap(), 4);

        assert_eq!(store.persist().await.unwrap(), PersistOutcome::Persisted);
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("vector_store");
        {
            let store = LocalStore::open(&dir).await.unwrap();
            store.add(record("a1", "kept", vec![1.0], "a.pdf")).await.unwrap();
            store.persist().await.unwrap();
        }

        let reopened = LocalStore::open(&dir).await.unwrap();
        assert_eq!(reopened.get("a1").await.unwrap().unwrap().text, "kept");
    }
}
