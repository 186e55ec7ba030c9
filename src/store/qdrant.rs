//! Qdrant vector database backend
//!
//! The collection is created lazily on the first insert, sized to the first
//! embedding it receives.

use super::{
    record_payload, split_payload, MetadataFilter, PersistOutcome, Record, SearchResult,
    StoreDescription, StoredRecord, VectorStore,
};
use crate::config::StoreBackend;
use crate::error::{Error, Result};
use crate::metadata::{MetadataValue, SOURCE_KEY};
use async_trait::async_trait;
use qdrant_client::qdrant::{
    Condition, CountPointsBuilder, CreateCollectionBuilder, Distance, Filter, GetCollectionInfoResponse,
    GetPointsBuilder, PointId, PointStruct, Range, ScrollPointsBuilder, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use std::collections::BTreeMap;
use tokio::sync::OnceCell;
use tracing::{debug, info};
use uuid::Uuid;

/// Qdrant store handle
pub struct QdrantStore {
    client: Qdrant,
    url: String,
    collection: String,
    dimension: OnceCell<usize>,
}

impl QdrantStore {
    /// Create a store handle; no request is made until first use
    pub fn new(url: &str, collection: &str) -> Result<Self> {
        debug!("Connecting to Qdrant at {}", url);

        let client = Qdrant::from_url(url)
            .skip_compatibility_check()
            .build()
            .map_err(|e| Error::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_string(),
            collection: collection.to_string(),
            dimension: OnceCell::new(),
        })
    }

    /// Ensure the collection exists with vectors of `dimension`
    async fn ensure_collection(&self, dimension: usize) -> Result<()> {
        let ready = *self
            .dimension
            .get_or_try_init(|| self.prepare_collection(dimension))
            .await?;

        if ready != dimension {
            return Err(Error::Qdrant(format!(
                "Vector dimension mismatch for collection '{}': expected {} (got {})",
                self.collection, ready, dimension
            )));
        }
        Ok(())
    }

    async fn prepare_collection(&self, dimension: usize) -> Result<usize> {
        if self.client.collection_exists(&self.collection).await? {
            debug!("Collection {} already exists", self.collection);
            let info = self.client.collection_info(&self.collection).await?;
            return Ok(vector_size(&info).map(|s| s as usize).unwrap_or(dimension));
        }

        info!(
            "Creating collection {} with dimension {}",
            self.collection, dimension
        );

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(VectorParamsBuilder::new(dimension as u64, Distance::Cosine)),
            )
            .await?;

        Ok(dimension)
    }

    async fn collection_exists(&self) -> Result<bool> {
        if self.dimension.initialized() {
            return Ok(true);
        }
        Ok(self.client.collection_exists(&self.collection).await?)
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn get(&self, id: &str) -> Result<Option<StoredRecord>> {
        if !self.collection_exists().await? {
            return Ok(None);
        }

        let response = self
            .client
            .get_points(
                GetPointsBuilder::new(&self.collection, vec![point_id(id)]).with_payload(true),
            )
            .await?;

        Ok(response
            .result
            .into_iter()
            .next()
            .map(|p| split_payload(p.payload, id.to_string())))
    }

    async fn add(&self, record: Record) -> Result<()> {
        self.ensure_collection(record.embedding.len()).await?;

        let payload = record_payload(&record);
        let point = PointStruct::new(point_id(&record.id), record.embedding, payload);

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]).wait(true))
            .await?;

        Ok(())
    }

    async fn similarity_search(
        &self,
        query: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<SearchResult>> {
        if k == 0 || !self.collection_exists().await? {
            return Ok(Vec::new());
        }

        debug!("Searching collection {} with limit {}", self.collection, k);

        let mut search_builder =
            SearchPointsBuilder::new(&self.collection, query.to_vec(), k as u64).with_payload(true);

        if let Some(qdrant_filter) = filter.and_then(to_qdrant_filter) {
            search_builder = search_builder.filter(qdrant_filter);
        }

        let response = self.client.search_points(search_builder).await?;

        Ok(response
            .result
            .into_iter()
            .map(|p| {
                let record = split_payload(p.payload, point_id_to_string(p.id));
                SearchResult {
                    id: record.id,
                    score: p.score,
                    text: record.text,
                    metadata: record.metadata,
                }
            })
            .collect())
    }

    async fn count(&self) -> Result<usize> {
        if !self.collection_exists().await? {
            return Ok(0);
        }

        let response = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await?;

        Ok(response.result.map(|r| r.count).unwrap_or(0) as usize)
    }

    async fn source_counts(&self) -> Result<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        if !self.collection_exists().await? {
            return Ok(counts);
        }

        let mut offset: Option<PointId> = None;
        let batch_size = 1000u32;

        loop {
            let mut scroll_builder = ScrollPointsBuilder::new(&self.collection)
                .limit(batch_size)
                .with_payload(true)
                .with_vectors(false);

            if let Some(ref o) = offset {
                scroll_builder = scroll_builder.offset(o.clone());
            }

            let response = self.client.scroll(scroll_builder).await?;
            if response.result.is_empty() {
                break;
            }

            for point in response.result {
                let record = split_payload(point.payload, String::new());
                if let Some(source) = record.metadata.get(SOURCE_KEY).and_then(|v| v.as_str()) {
                    *counts.entry(source.to_string()).or_insert(0) += 1;
                }
            }

            offset = response.next_page_offset;
            if offset.is_none() {
                break;
            }
        }

        Ok(counts)
    }

    async fn persist(&self) -> Result<PersistOutcome> {
        Ok(PersistOutcome::Unsupported)
    }

    fn describe(&self) -> StoreDescription {
        StoreDescription {
            backend: StoreBackend::Qdrant,
            location: format!("{} (collection '{}')", self.url, self.collection),
        }
    }
}

/// Qdrant point ids must be UUIDs or integers; other ids map to a stable v5 UUID
pub fn point_uuid(id: &str) -> Uuid {
    Uuid::try_parse(id).unwrap_or_else(|_| Uuid::new_v5(&Uuid::NAMESPACE_OID, id.as_bytes()))
}

fn point_id(id: &str) -> PointId {
    PointId::from(point_uuid(id).to_string())
}

fn to_qdrant_filter(filter: &MetadataFilter) -> Option<Filter> {
    let must: Vec<Condition> = filter
        .must
        .iter()
        .map(|(key, value)| match value {
            MetadataValue::String(s) => Condition::matches(key.as_str(), s.clone()),
            MetadataValue::Int(i) => Condition::matches(key.as_str(), *i),
            MetadataValue::UInt(u) => Condition::matches(key.as_str(), u.to_string()),
            MetadataValue::Bool(b) => Condition::matches(key.as_str(), *b),
            MetadataValue::Float(f) => Condition::range(
                key.as_str(),
                Range {
                    gte: Some(*f),
                    lte: Some(*f),
                    ..Default::default()
                },
            ),
            MetadataValue::Null => Condition::is_null(key.as_str()),
        })
        .collect();

    if must.is_empty() {
        return None;
    }

    Some(Filter::must(must))
}

fn vector_size(info: &GetCollectionInfoResponse) -> Option<u64> {
    let result = info.result.as_ref()?;
    let config = result.config.as_ref()?;
    let params = config.params.as_ref()?;
    let vectors_config = params.vectors_config.as_ref()?;

    match vectors_config.config.as_ref()? {
        qdrant_client::qdrant::vectors_config::Config::Params(params) => Some(params.size),
        qdrant_client::qdrant::vectors_config::Config::ParamsMap(_) => None,
    }
}

/// Convert PointId to string
fn point_id_to_string(id: Option<PointId>) -> String {
    match id {
        Some(PointId {
            point_id_options: Some(qdrant_client::qdrant::point_id::PointIdOptions::Uuid(uuid)),
        }) => uuid,
        Some(PointId {
            point_id_options: Some(qdrant_client::qdrant::point_id::PointIdOptions::Num(num)),
        }) => num.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_uuid_is_stable() {
        let a = point_uuid("COMPANY_PROFILE");
        let b = point_uuid("COMPANY_PROFILE");
        assert_eq!(a, b);
        assert_ne!(a, point_uuid("other"));
    }

    #[test]
    fn test_point_uuid_keeps_uuid_ids() {
        let id = Uuid::new_v4();
        assert_eq!(point_uuid(&id.to_string()), id);
    }

    #[test]
    fn test_source_filter_to_qdrant() {
        let filter = MetadataFilter::source("call.pdf");
        let qdrant_filter = to_qdrant_filter(&filter).unwrap();
        assert_eq!(qdrant_filter.must.len(), 1);

        assert!(to_qdrant_filter(&MetadataFilter::default()).is_none());
    }

    #[test]
    fn test_point_id_to_string() {
        let id = Uuid::new_v4();
        assert_eq!(point_id_to_string(Some(point_id(&id.to_string()))), id.to_string());
        assert_eq!(point_id_to_string(None), "");
    }

    #[tokio::test]
    async fn test_describe_names_collection() {
        let store = QdrantStore::new("http://127.0.0.1:6334", "grant_proposals").unwrap();
        let description = store.describe();
        assert_eq!(description.backend, StoreBackend::Qdrant);
        assert!(description.location.contains("grant_proposals"));
    }
}
