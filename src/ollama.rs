//! HTTP client for an Ollama model server
//!
//! Serves both the embedding endpoint (`/api/embed`) and the non-streaming
//! generation endpoint (`/api/generate`).

use crate::config::OllamaConfig;
use crate::error::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

#[derive(Debug, Clone, Serialize)]
struct EmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum EmbeddingResponse {
    Embeddings { embeddings: Vec<Vec<f32>> },
    Single { embedding: Vec<f32> },
    Data { data: Vec<EmbeddingData> },
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingResponse {
    fn into_embeddings(self) -> Vec<Vec<f32>> {
        match self {
            EmbeddingResponse::Embeddings { embeddings } => embeddings,
            EmbeddingResponse::Single { embedding } => vec![embedding],
            EmbeddingResponse::Data { data } => data.into_iter().map(|d| d.embedding).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct OllamaClient {
    client: Client,
    base_url: Url,
    retries: usize,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let base_url = Url::parse(&config.url)?;
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            retries: config.retries,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid Ollama URL: {}", e)))
    }

    async fn send_with_retry<T: for<'de> Deserialize<'de>>(
        &self,
        request: reqwest::RequestBuilder,
        wrap: fn(String) -> Error,
    ) -> Result<T> {
        let mut last_err: Option<Error> = None;
        for attempt in 0..=self.retries {
            let req = request
                .try_clone()
                .ok_or_else(|| wrap("Failed to clone model server request".to_string()))?;
            match req.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<T>()
                            .await
                            .map_err(|e| wrap(format!("Unexpected response body: {}", e)));
                    }
                    let body = response.text().await.unwrap_or_default();
                    last_err = Some(wrap(format!("HTTP {} - {}", status, body.trim())));
                }
                Err(e) => last_err = Some(wrap(e.to_string())),
            }

            if attempt < self.retries {
                warn!(
                    "Model server request failed (attempt {}/{}), retrying",
                    attempt + 1,
                    self.retries + 1
                );
                tokio::time::sleep(Duration::from_millis(200 * (attempt + 1) as u64)).await;
            }
        }

        Err(last_err.unwrap_or_else(|| wrap("Model server request failed".to_string())))
    }

    /// Embed a batch of texts with the named model
    pub async fn embed(&self, model: &str, inputs: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let url = self.endpoint("/api/embed")?;
        let expected = inputs.len();
        debug!("Embedding {} texts with {}", expected, model);

        let request = EmbedRequest {
            model: model.to_string(),
            input: inputs,
        };
        let parsed: EmbeddingResponse = self
            .send_with_retry(self.client.post(url).json(&request), Error::Embedding)
            .await?;

        let embeddings = parsed.into_embeddings();
        if embeddings.len() != expected {
            return Err(Error::Embedding(format!(
                "Expected {} embeddings from model '{}', got {}",
                expected,
                model,
                embeddings.len()
            )));
        }
        Ok(embeddings)
    }

    /// Generate a completion for a prompt (no streaming)
    pub async fn generate(
        &self,
        model: &str,
        prompt: &str,
        temperature: Option<f32>,
    ) -> Result<String> {
        let url = self.endpoint("/api/generate")?;
        debug!("Generating with {} ({} prompt chars)", model, prompt.len());

        let request = GenerateRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
            stream: false,
            options: temperature.map(|temperature| GenerateOptions { temperature }),
        };
        let parsed: GenerateResponse = self
            .send_with_retry(self.client.post(url).json(&request), Error::Llm)
            .await?;
        Ok(parsed.response)
    }
}
