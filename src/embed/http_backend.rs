use super::Embedder;
use crate::config::{EmbeddingConfig, OllamaConfig};
use crate::error::Result;
use crate::ollama::OllamaClient;
use async_trait::async_trait;

/// Embedder backed by an Ollama server
pub struct HttpEmbedder {
    client: OllamaClient,
    model_id: String,
}

impl HttpEmbedder {
    pub fn new(ollama: &OllamaConfig, config: &EmbeddingConfig) -> Result<Self> {
        let client = OllamaClient::new(ollama)?;
        Ok(Self {
            client,
            model_id: config.model.clone(),
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        self.client.embed(&self.model_id, texts).await
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }
}
