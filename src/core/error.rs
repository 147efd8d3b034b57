

use thiserror::Error;

use crate::llm::embeddings::EmbeddingError;
use crate::llm::providers::base::LlmProviderError;
use crate::toolkit::retrieval::index::VectorIndexError;


#[derive(Error, Debug)]
pub enum ConciergeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM provider error: {0}")]
    LlmProvider(#[from] LlmProviderError),

    #[error("Embedding generation error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Vector search error: {0}")]
    VectorSearch(#[from] VectorIndexError),

    #[error("Sentiment scoring error: {0}")]
    Sentiment(String),

    #[error("Recommendation model error: {0}")]
    Recommendation(String),

    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ConciergeError {
    pub fn timeout(operation: impl Into<String>, seconds: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            seconds,
        }
    }

    /// True for failures of a collaborator outside this crate (model hosts, index, network).
    pub fn is_external(&self) -> bool {
        !matches!(self, Self::Config(_) | Self::Validation(_) | Self::Serialization(_))
    }
}


pub type Result<T> = std::result::Result<T, ConciergeError>;
