//! Vector store access
//!
//! This module provides:
//! - A `VectorStore` trait shared by ingestion and qualification
//! - A local SQLite-backed store kept in a persistence directory
//! - A Qdrant-backed store

mod local;
mod payload;
mod qdrant;

pub use local::*;
pub use payload::*;
pub use qdrant::*;

use crate::config::{Config, StoreBackend};
use crate::error::{Error, Result};
use crate::metadata::{Metadata, MetadataValue, SOURCE_KEY};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// A record to be written
#[derive(Debug, Clone)]
pub struct Record {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: Metadata,
}

/// A record read back by identifier
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: String,
    pub text: String,
    pub metadata: Metadata,
}

/// Search result
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub id: String,
    pub score: f32,
    pub text: String,
    pub metadata: Metadata,
}

/// Exact-match metadata filter; every condition must hold
#[derive(Debug, Clone, Default)]
pub struct MetadataFilter {
    pub must: Vec<(String, MetadataValue)>,
}

impl MetadataFilter {
    /// Filter on the `source` key
    pub fn source(filename: &str) -> Self {
        Self {
            must: vec![(SOURCE_KEY.to_string(), MetadataValue::from(filename))],
        }
    }

    pub fn matches(&self, metadata: &Metadata) -> bool {
        self.must
            .iter()
            .all(|(key, value)| metadata.get(key) == Some(value))
    }

    /// The `source` value this filter requires, if any
    pub fn source_value(&self) -> Option<&str> {
        self.must
            .iter()
            .find(|(key, _)| key == SOURCE_KEY)
            .and_then(|(_, value)| value.as_str())
    }
}

/// Result of asking a store to flush to durable storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    Persisted,
    Unsupported,
}

/// Human-readable store identity
#[derive(Debug, Clone)]
pub struct StoreDescription {
    pub backend: StoreBackend,
    pub location: String,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Fetch a record by identifier
    async fn get(&self, id: &str) -> Result<Option<StoredRecord>>;

    /// Insert a record, replacing any record with the same identifier
    async fn add(&self, record: Record) -> Result<()>;

    /// Up to `k` records most similar to `query`, best first
    async fn similarity_search(
        &self,
        query: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>>;

    /// Total number of records
    async fn count(&self) -> Result<usize>;

    /// Number of records per `source` metadata value
    async fn source_counts(&self) -> Result<BTreeMap<String, usize>>;

    /// Flush to durable storage when the backend supports it
    async fn persist(&self) -> Result<PersistOutcome>;

    fn describe(&self) -> StoreDescription;
}

/// Open the store selected by configuration
pub async fn open_store(config: &Config) -> Result<Box<dyn VectorStore>> {
    match config.store.backend {
        StoreBackend::Local => {
            let store = LocalStore::open(&config.store.persist_path).await?;
            Ok(Box::new(store))
        }
        StoreBackend::Qdrant => {
            let store = QdrantStore::new(&config.store.qdrant_url, &config.store.collection_name)?;
            Ok(Box::new(store))
        }
    }
}

/// Encode a vector as little-endian f32 bytes
pub(crate) fn encode_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Decode little-endian f32 bytes
pub(crate) fn decode_vector(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(Error::Store(format!(
            "Stored embedding has {} bytes, not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::source_metadata;

    #[test]
    fn test_source_filter_matches() {
        let filter = MetadataFilter::source("a.pdf");
        assert!(filter.matches(&source_metadata("a.pdf")));
        assert!(!filter.matches(&source_metadata("b.pdf")));
        assert!(!filter.matches(&Metadata::new()));
        assert_eq!(filter.source_value(), Some("a.pdf"));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = MetadataFilter::default();
        assert!(filter.matches(&Metadata::new()));
        assert_eq!(filter.source_value(), None);
    }

    #[test]
    fn test_vector_bytes() {
        let vector = vec![0.25f32, -1.5, 3.0];
        let bytes = encode_vector(&vector);
        assert_eq!(bytes.len(), 12);
        assert_eq!(decode_vector(&bytes).unwrap(), vector);
        assert!(decode_vector(&bytes[..5]).is_err());
    }
}
