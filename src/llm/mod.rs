

pub mod embeddings;
pub mod factory;
pub mod providers;
pub mod sentiment;

pub use embeddings::{EmbeddingError, EmbeddingGenerator, EmbeddingProvider};
pub use factory::{EmbeddingProviderFactory, LlmProviderFactory};
pub use providers::{LlmMetadata, LlmProvider, LlmProviderError, LlmProviderWithFallback};
pub use sentiment::{LlmSentimentScorer, SentimentScorer};
