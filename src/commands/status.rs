//! Status command implementation

use crate::commands::ingest::COMPANY_PROFILE_ID;
use crate::config::{Config, StoreBackend};
use crate::error::Result;
use crate::store::VectorStore;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Status information
#[derive(Debug, Clone, Serialize)]
pub struct StatusInfo {
    pub backend: StoreBackend,
    pub location: String,
    pub ollama_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub store_connected: bool,
    pub total_records: usize,
    pub profile_indexed: bool,
    pub sources: BTreeMap<String, usize>,
}

/// Gather store contents and configuration
pub async fn cmd_status(config: &Config, store: &dyn VectorStore) -> Result<StatusInfo> {
    info!("Getting status");

    let description = store.describe();

    let (store_connected, total_records) = match store.count().await {
        Ok(count) => (true, count),
        Err(e) => {
            debug!("Vector store error: {:?}", e);
            (false, 0)
        }
    };

    let (profile_indexed, sources) = if store_connected {
        let profile = store.get(COMPANY_PROFILE_ID).await?.is_some();
        (profile, store.source_counts().await?)
    } else {
        (false, BTreeMap::new())
    };

    Ok(StatusInfo {
        backend: description.backend,
        location: description.location,
        ollama_url: config.ollama.url.clone(),
        embedding_model: config.embedding.model.clone(),
        chat_model: config.chat.model.clone(),
        store_connected,
        total_records,
        profile_indexed,
        sources,
    })
}

/// Print status to console
pub fn print_status(status: &StatusInfo) {
    println!("\n📊 grant-qualifier Status\n");
    println!("Vector store:");
    println!("  Backend: {}", status.backend);
    println!("  Location: {}", status.location);

    let connection_status = if status.store_connected {
        "✓ Connected"
    } else {
        "✗ Not connected"
    };
    println!("  Status: {}", connection_status);
    println!("  Records: {}", status.total_records);

    println!("\nOllama: {}", status.ollama_url);
    println!("  Embedding model: {}", status.embedding_model);
    println!("  Chat model: {}", status.chat_model);

    let profile_status = if status.profile_indexed {
        "✓ Indexed"
    } else {
        "⚠ Not indexed (run 'grant-qualifier ingest')"
    };
    println!("\nCompany profile: {}", profile_status);

    println!("\nProposals:");
    if status.sources.is_empty() {
        println!("  No proposals indexed.");
    }
    for (source, chunks) in &status.sources {
        println!("  • {} ({} chunks)", source, chunks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ingest::index_proposal_pages;
    use crate::commands::test_support::FakeEmbedder;
    use crate::config::ChunkConfig;
    use crate::store::LocalStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_status_of_empty_store() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::open(tmp.path()).await.unwrap();

        let status = cmd_status(&Config::default(), &store).await.unwrap();
        assert_eq!(status.backend, StoreBackend::Local);
        assert!(status.store_connected);
        assert_eq!(status.total_records, 0);
        assert!(!status.profile_indexed);
        assert!(status.sources.is_empty());
    }

    #[tokio::test]
    async fn test_status_counts_sources() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::open(tmp.path()).await.unwrap();
        let embedder = FakeEmbedder::new();
        let pages = vec!["Grant call text.".to_string()];

        index_proposal_pages("a.pdf", &pages, &store, &embedder, &ChunkConfig::default())
            .await
            .unwrap();

        let status = cmd_status(&Config::default(), &store).await.unwrap();
        assert_eq!(status.total_records, 1);
        assert_eq!(status.sources.get("a.pdf"), Some(&1));
    }
}
