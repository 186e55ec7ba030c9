//! Ingest command implementation

use crate::chunk::{chunk_text, join_pages};
use crate::config::{ChunkConfig, Config};
use crate::embed::{embed_one, Embedder};
use crate::error::Result;
use crate::metadata::{normalize_metadata, source_metadata};
use crate::parse::{extract_pages, file_name, list_pdfs};
use crate::progress::{advance_progress, finish_progress, start_progress_bar};
use crate::store::{PersistOutcome, Record, VectorStore};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Fixed identifier of the company profile record
pub const COMPANY_PROFILE_ID: &str = "COMPANY_PROFILE";

/// What happened to the company profile during ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ProfileOutcome {
    Missing,
    Invalid(String),
    AlreadyIndexed,
    Indexed,
}

/// Statistics from an ingestion run
#[derive(Debug, Clone, Serialize)]
pub struct IngestStats {
    pub profile: ProfileOutcome,
    pub proposals_processed: usize,
    pub chunks_created: usize,
    pub persisted: bool,
}

/// Read the profile file, returning its description and the full object
fn read_profile(path: &Path) -> std::result::Result<(String, Map<String, Value>), String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let value: Value =
        serde_json::from_str(&content).map_err(|e| format!("Failed to load JSON: {}", e))?;

    let Value::Object(profile) = value else {
        return Err("Company profile must be a JSON object".to_string());
    };

    let description = match profile.get("description") {
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err("Field 'description' must be a string".to_string()),
        None => return Err("Missing required field 'description'".to_string()),
    };

    Ok((description, profile))
}

/// Index the company profile once under [`COMPANY_PROFILE_ID`].
///
/// A missing or malformed file is logged and reported in the outcome; only
/// store and embedding failures are errors.
pub async fn ingest_company_profile(
    path: &Path,
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
) -> Result<ProfileOutcome> {
    info!("Loading company profile from {}", path.display());

    if !path.exists() {
        error!("Company profile {} not found", path.display());
        return Ok(ProfileOutcome::Missing);
    }

    let (description, profile) = match read_profile(path) {
        Ok(parsed) => parsed,
        Err(reason) => {
            error!("Invalid company profile {}: {}", path.display(), reason);
            return Ok(ProfileOutcome::Invalid(reason));
        }
    };

    if store.get(COMPANY_PROFILE_ID).await?.is_some() {
        info!("Company profile already indexed");
        return Ok(ProfileOutcome::AlreadyIndexed);
    }

    info!("Indexing company profile");
    let embedding = embed_one(embedder, &description).await?;
    store
        .add(Record {
            id: COMPANY_PROFILE_ID.to_string(),
            text: description,
            embedding,
            metadata: normalize_metadata(&profile),
        })
        .await?;

    Ok(ProfileOutcome::Indexed)
}

/// Extract, chunk and index one proposal PDF; returns the chunks inserted
pub async fn ingest_proposal(
    path: &Path,
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    chunk_config: &ChunkConfig,
) -> Result<usize> {
    let filename = file_name(path)?;
    info!("Processing {}", filename);

    let pages = extract_pages(path)?;
    index_proposal_pages(&filename, &pages, store, embedder, chunk_config).await
}

/// Chunk page texts and insert every chunk under `source = filename`
pub async fn index_proposal_pages(
    filename: &str,
    pages: &[String],
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    chunk_config: &ChunkConfig,
) -> Result<usize> {
    let text = join_pages(pages);
    let chunks = chunk_text(&text, chunk_config);
    info!("Embedding {} chunks from {}", chunks.len(), filename);

    let progress = start_progress_bar(chunks.len(), "Embedding");
    let mut inserted = 0;

    for chunk in chunks {
        let embedding = embed_one(embedder, &chunk).await?;
        store
            .add(Record {
                id: Uuid::new_v4().to_string(),
                text: chunk,
                embedding,
                metadata: source_metadata(filename),
            })
            .await?;
        inserted += 1;
        advance_progress(&progress);
    }

    finish_progress(progress, "Embedded");
    debug!("Inserted {} chunks for {}", inserted, filename);
    Ok(inserted)
}

/// Ask the store to flush; never fails the run
pub async fn persist_store(store: &dyn VectorStore) -> bool {
    match store.persist().await {
        Ok(PersistOutcome::Persisted) => {
            info!("Vector store persisted.");
            true
        }
        Ok(PersistOutcome::Unsupported) => {
            warn!(
                "Persistence not available for the {} store; data may be in-memory only",
                store.describe().backend
            );
            false
        }
        Err(e) => {
            warn!("Failed to persist vector store: {}", e);
            false
        }
    }
}

/// Run the full ingestion: profile, every proposal PDF, then persist
pub async fn cmd_ingest(
    config: &Config,
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
) -> Result<IngestStats> {
    let profile = ingest_company_profile(&config.inputs.profile_file, store, embedder).await?;

    let proposals_dir = &config.inputs.proposals_dir;
    let pdfs = list_pdfs(proposals_dir)?;

    let mut proposals_processed = 0;
    let mut chunks_created = 0;

    if pdfs.is_empty() {
        warn!("No PDFs found in {}.", proposals_dir.display());
    } else {
        for pdf in &pdfs {
            chunks_created += ingest_proposal(pdf, store, embedder, &config.chunk).await?;
            proposals_processed += 1;
        }
    }

    let persisted = persist_store(store).await;
    info!("Embedding complete.");

    Ok(IngestStats {
        profile,
        proposals_processed,
        chunks_created,
        persisted,
    })
}
