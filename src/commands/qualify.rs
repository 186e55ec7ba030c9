//! Qualify command implementation

use crate::commands::ingest::COMPANY_PROFILE_ID;
use crate::config::{Config, RetrievalConfig};
use crate::embed::{embed_one, Embedder};
use crate::error::{Error, Result};
use crate::llm::LanguageModel;
use crate::parse::{file_name, list_pdfs};
use crate::store::{MetadataFilter, VectorStore};
use crate::verdict::{no_content_verdict, parse_verdict};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Load the indexed company profile text
pub async fn load_company_profile(store: &dyn VectorStore) -> Result<String> {
    info!("Loading company profile");

    match store.get(COMPANY_PROFILE_ID).await? {
        Some(record) if !record.text.is_empty() => Ok(record.text),
        _ => Err(Error::ProfileNotFound),
    }
}

/// Produce the verdict for one proposal.
///
/// Retrieval is restricted to chunks whose `source` is `filename`. When none
/// are indexed the canned negative verdict is returned without calling the
/// model.
pub async fn qualify_proposal(
    filename: &str,
    company_text: &str,
    query_embedding: &[f32],
    store: &dyn VectorStore,
    llm: &dyn LanguageModel,
    retrieval: &RetrievalConfig,
) -> Result<Value> {
    info!("Processing {}", filename);

    let filter = MetadataFilter::source(filename);
    let chunks = store
        .similarity_search(query_embedding, retrieval.k, Some(&filter))
        .await?;

    if chunks.is_empty() {
        info!("No indexed content for {}", filename);
        return Ok(no_content_verdict());
    }

    debug!("Retrieved {} chunks for {}", chunks.len(), filename);

    let proposal_text = chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let prompt = retrieval
        .template
        .render(company_text, filename, &proposal_text);
    let output = llm.generate(&prompt).await?;

    Ok(parse_verdict(&output))
}

/// Qualify every proposal PDF in the proposals directory
pub async fn cmd_qualify(
    config: &Config,
    store: &dyn VectorStore,
    embedder: &dyn Embedder,
    llm: &dyn LanguageModel,
) -> Result<BTreeMap<String, Value>> {
    let company_text = load_company_profile(store).await?;
    let pdfs = list_pdfs(&config.inputs.proposals_dir)?;

    let mut results = BTreeMap::new();
    if pdfs.is_empty() {
        info!(
            "No PDFs found in {}",
            config.inputs.proposals_dir.display()
        );
        return Ok(results);
    }

    let retrieval = &config.retrieval;
    let query_embedding = embed_one(embedder, &retrieval.query).await?;
    info!(
        "Qualifying {} proposals with template '{}' using {}",
        pdfs.len(),
        retrieval.template,
        llm.model_name()
    );

    for pdf in &pdfs {
        let filename = file_name(pdf)?;
        let verdict = qualify_proposal(
            &filename,
            &company_text,
            &query_embedding,
            store,
            llm,
            retrieval,
        )
        .await?;
        results.insert(filename, verdict);
    }

    Ok(results)
}
