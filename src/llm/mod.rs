pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Generation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Generation API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Generation API returned no text")]
    Empty,
}

/// A text-generation backend.
/// One call is one attempt: implementations must not retry or substitute text.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, system: &str, user: &str) -> Result<String, GenerationError>;
}
