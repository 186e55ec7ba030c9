use super::LanguageModel;
use crate::config::{ChatConfig, OllamaConfig};
use crate::error::Result;
use crate::ollama::OllamaClient;
use async_trait::async_trait;
use tracing::info;

/// Language model served by an Ollama server
pub struct HttpLanguageModel {
    client: OllamaClient,
    model_id: String,
    temperature: Option<f32>,
}

impl HttpLanguageModel {
    pub fn new(ollama: &OllamaConfig, config: &ChatConfig) -> Result<Self> {
        let client = OllamaClient::new(ollama)?;
        Ok(Self {
            client,
            model_id: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl LanguageModel for HttpLanguageModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        info!("Generating with model: {}", self.model_id);
        self.client
            .generate(&self.model_id, prompt, self.temperature)
            .await
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_generate_uses_chat_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({"model": "llama3.2:3b", "stream": false})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"response": "{\"qualifies\": \"yes\"}"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let ollama = OllamaConfig {
            url: server.uri(),
            timeout_secs: 5,
            retries: 0,
        };
        let chat = ChatConfig {
            model: "llama3.2:3b".to_string(),
            temperature: None,
        };
        let model = HttpLanguageModel::new(&ollama, &chat).unwrap();

        let text = model.generate("prompt").await.unwrap();
        assert_eq!(text, "{\"qualifies\": \"yes\"}");
        assert_eq!(model.model_name(), "llama3.2:3b");
    }
}
