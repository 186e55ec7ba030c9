//! Default values for configuration

use super::StoreBackend;
use crate::prompt::PromptTemplate;
use std::path::PathBuf;

/// Default Ollama server URL, shared by embeddings and generation
pub fn default_ollama_url() -> String {
    std::env::var("OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string())
}

/// Default HTTP request timeout in seconds (generation on CPU can be slow)
pub fn default_ollama_timeout() -> u64 {
    300
}

/// Default number of retries for model server requests
pub fn default_ollama_retries() -> usize {
    0
}

/// Default embedding model
pub fn default_embedding_model() -> String {
    std::env::var("OLLAMA_EMBED_MODEL").unwrap_or_else(|_| "mxbai-embed-large".to_string())
}

/// Default chat model
pub fn default_chat_model() -> String {
    std::env::var("OLLAMA_CHAT_MODEL").unwrap_or_else(|_| "llama3.2:3b".to_string())
}

/// Default store backend
pub fn default_store_backend() -> StoreBackend {
    std::env::var("VECTOR_STORE_BACKEND")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(StoreBackend::Local)
}

/// Default persistence directory for the local store
pub fn default_persist_path() -> PathBuf {
    std::env::var("VECTOR_STORE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./vector_store"))
}

/// Default Qdrant gRPC URL for local development (port 6334, not 6333 REST)
pub fn default_qdrant_url() -> String {
    std::env::var("QDRANT_URL").unwrap_or_else(|_| "http://127.0.0.1:6334".to_string())
}

/// Default collection name
pub fn default_collection_name() -> String {
    "grant_proposals".to_string()
}

/// Default maximum characters per chunk
pub fn default_chunk_max_chars() -> usize {
    1000
}

/// Default overlap characters between chunks
pub fn default_chunk_overlap() -> usize {
    100
}

/// Default retrieval query
pub fn default_retrieval_query() -> String {
    "company profile and grant proposals".to_string()
}

/// Default number of chunks retrieved per proposal
pub fn default_retrieval_k() -> usize {
    5
}

/// Default prompt template
pub fn default_prompt_template() -> PromptTemplate {
    PromptTemplate::Verdict
}

/// Default company profile path
pub fn default_profile_file() -> PathBuf {
    PathBuf::from("company_info.json")
}

/// Default proposals directory
pub fn default_proposals_dir() -> PathBuf {
    PathBuf::from("grant_docs")
}
