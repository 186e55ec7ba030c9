//! Configuration management for grant-qualifier
//!
//! Configuration comes from an optional TOML file. Any field the file omits
//! falls back to a default, several of which read environment variables
//! (`OLLAMA_URL`, `OLLAMA_EMBED_MODEL`, `OLLAMA_CHAT_MODEL`,
//! `VECTOR_STORE_PATH`, `VECTOR_STORE_BACKEND`, `QDRANT_URL`).

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use crate::prompt::PromptTemplate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ollama server settings
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Embedding model configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Chat model configuration
    #[serde(default)]
    pub chat: ChatConfig,

    /// Vector store configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Chunking configuration
    #[serde(default)]
    pub chunk: ChunkConfig,

    /// Retrieval and prompting configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Input file locations
    #[serde(default)]
    pub inputs: InputsConfig,
}

/// Ollama server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server
    #[serde(default = "default_ollama_url")]
    pub url: String,

    /// Request timeout in seconds
    #[serde(default = "default_ollama_timeout")]
    pub timeout_secs: u64,

    /// Retries per request (0 disables retrying)
    #[serde(default = "default_ollama_retries")]
    pub retries: usize,
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Model name as known to the embedding server
    #[serde(default = "default_embedding_model")]
    pub model: String,
}

/// Chat model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Model name as known to the generation server
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// Sampling temperature (server default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Which vector store implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// SQLite file inside the persistence directory
    Local,
    /// Remote Qdrant collection
    Qdrant,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Local => write!(f, "local"),
            StoreBackend::Qdrant => write!(f, "qdrant"),
        }
    }
}

impl FromStr for StoreBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "local" | "sqlite" => Ok(StoreBackend::Local),
            "qdrant" => Ok(StoreBackend::Qdrant),
            _ => Err(Error::Config(format!("Unknown store backend: {}", s))),
        }
    }
}

/// Vector store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend kind
    #[serde(default = "default_store_backend")]
    pub backend: StoreBackend,

    /// Persistence directory (local backend)
    #[serde(default = "default_persist_path")]
    pub persist_path: PathBuf,

    /// Qdrant connection URL (qdrant backend)
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,

    /// Qdrant collection name (qdrant backend)
    #[serde(default = "default_collection_name")]
    pub collection_name: String,
}

/// Chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkConfig {
    /// Maximum characters per chunk
    #[serde(default = "default_chunk_max_chars")]
    pub max_chars: usize,

    /// Overlap characters between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub overlap_chars: usize,
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Query text embedded for every proposal search
    #[serde(default = "default_retrieval_query")]
    pub query: String,

    /// Number of chunks retrieved per proposal
    #[serde(default = "default_retrieval_k")]
    pub k: usize,

    /// Prompt template sent to the language model
    #[serde(default = "default_prompt_template")]
    pub template: PromptTemplate,
}

/// Input locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputsConfig {
    /// Company profile JSON file
    #[serde(default = "default_profile_file")]
    pub profile_file: PathBuf,

    /// Directory holding proposal PDFs
    #[serde(default = "default_proposals_dir")]
    pub proposals_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama: OllamaConfig::default(),
            embedding: EmbeddingConfig::default(),
            chat: ChatConfig::default(),
            store: StoreConfig::default(),
            chunk: ChunkConfig::default(),
            retrieval: RetrievalConfig::default(),
            inputs: InputsConfig::default(),
        }
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: default_ollama_url(),
            timeout_secs: default_ollama_timeout(),
            retries: default_ollama_retries(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: default_chat_model(),
            temperature: None,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            persist_path: default_persist_path(),
            qdrant_url: default_qdrant_url(),
            collection_name: default_collection_name(),
        }
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chars: default_chunk_max_chars(),
            overlap_chars: default_chunk_overlap(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            query: default_retrieval_query(),
            k: default_retrieval_k(),
            template: default_prompt_template(),
        }
    }
}

impl Default for InputsConfig {
    fn default() -> Self {
        Self {
            profile_file: default_profile_file(),
            proposals_dir: default_proposals_dir(),
        }
    }
}

impl Config {
    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Config = toml::from_str(&content)?;

        config.validate()?;
        Ok(config)
    }

    /// Load from a file when given, otherwise build from defaults and environment
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load(path),
            None => {
                debug!("No config file given, using defaults");
                let config = Config::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.chunk.max_chars == 0 {
            return Err(Error::Config("chunk.max_chars must be > 0".to_string()));
        }

        if self.chunk.overlap_chars >= self.chunk.max_chars {
            return Err(Error::Config(
                "chunk.overlap_chars must be < chunk.max_chars".to_string(),
            ));
        }

        if self.retrieval.k == 0 {
            return Err(Error::Config("retrieval.k must be > 0".to_string()));
        }

        if self.embedding.model.trim().is_empty() {
            return Err(Error::Config("embedding.model must not be empty".to_string()));
        }

        if self.chat.model.trim().is_empty() {
            return Err(Error::Config("chat.model must not be empty".to_string()));
        }

        if let Some(temperature) = self.chat.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(Error::Config(
                    "chat.temperature must be between 0.0 and 2.0".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.chunk.max_chars, 1000);
        assert_eq!(config.chunk.overlap_chars, 100);
        assert_eq!(config.retrieval.k, 5);
        assert_eq!(config.retrieval.query, "company profile and grant proposals");
        assert_eq!(config.retrieval.template, PromptTemplate::Verdict);
        assert_eq!(config.inputs.profile_file, PathBuf::from("company_info.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_save_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");

        let mut config = Config::default();
        config.store.collection_name = "test_collection".to_string();
        config.retrieval.template = PromptTemplate::Rubric;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.store.collection_name, "test_collection");
        assert_eq!(loaded.retrieval.template, PromptTemplate::Rubric);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[retrieval]\nk = 8\n\n[store]\nbackend = \"qdrant\"\n").unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.retrieval.k, 8);
        assert_eq!(loaded.store.backend, StoreBackend::Qdrant);
        assert_eq!(loaded.chunk.max_chars, 1000);
        assert_eq!(loaded.store.collection_name, "grant_proposals");
    }

    #[test]
    fn test_missing_config_file() {
        let tmp = TempDir::new().unwrap();
        let err = Config::load(&tmp.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();

        // Invalid: overlap >= max
        config.chunk.overlap_chars = config.chunk.max_chars;
        assert!(config.validate().is_err());

        config.chunk.overlap_chars = 100;
        assert!(config.validate().is_ok());

        config.retrieval.k = 0;
        assert!(config.validate().is_err());
        config.retrieval.k = 5;

        config.chat.temperature = Some(3.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_backend_parsing() {
        assert_eq!("local".parse::<StoreBackend>().unwrap(), StoreBackend::Local);
        assert_eq!("QDRANT".parse::<StoreBackend>().unwrap(), StoreBackend::Qdrant);
        assert!("chroma".parse::<StoreBackend>().is_err());
        assert_eq!(StoreBackend::Qdrant.to_string(), "qdrant");
    }
}
