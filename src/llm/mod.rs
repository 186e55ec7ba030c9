//! Language model access for qualification

mod http_backend;

pub use http_backend::*;

use crate::config::Config;
use crate::error::Result;
use async_trait::async_trait;

/// A text-in, text-out completion model
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete a prompt, returning the full response text
    async fn generate(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

pub fn create_language_model(config: &Config) -> Result<Box<dyn LanguageModel>> {
    let model = HttpLanguageModel::new(&config.ollama, &config.chat)?;
    Ok(Box::new(model))
}
