//! grant-qualifier: index grant proposals and judge company eligibility
//! with a local retrieval-augmented pipeline.

pub mod chunk;
pub mod commands;
pub mod config;
pub mod embed;
pub mod error;
pub mod llm;
pub mod metadata;
pub mod ollama;
pub mod parse;
pub mod progress;
pub mod prompt;
pub mod store;
pub mod verdict;

pub use error::{Error, Result};
