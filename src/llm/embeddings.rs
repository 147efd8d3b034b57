
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::toolkit::retrieval::cache::{CacheStats, TtlCache};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";


#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Empty text")]
    EmptyText,

    #[error("Provider not implemented: {0}")]
    NotImplemented(String),
}


#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    fn model_name(&self) -> &str;
}


#[derive(Serialize)]
struct OllamaEmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct OpenAiEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingData>,
}

#[derive(Deserialize)]
struct OpenAiEmbeddingData {
    embedding: Vec<f32>,
}


pub struct EmbeddingGenerator {
    provider: String,
    model: String,
    url: String,
    api_key: Option<String>,
    client: Client,
    cache: TtlCache<Vec<f32>>,
}

impl EmbeddingGenerator {
    pub fn new(
        provider: impl Into<String>,
        model: impl Into<String>,
        url: Option<String>,
        api_key: Option<String>,
        cache_size: usize,
        cache_ttl: u64,
    ) -> Self {
        let provider = provider.into().to_lowercase();
        let model = model.into();
        let url = url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| match provider.as_str() {
                "ollama" => crate::DEFAULT_OLLAMA_URL.to_string(),
                _ => OPENAI_API_URL.to_string(),
            });

        info!(
            "EmbeddingGenerator initialized: provider={}, model={}, cache={}",
            provider, model, cache_size
        );

        Self {
            provider,
            model,
            url,
            api_key,
            client: Client::new(),
            cache: TtlCache::new(cache_size, cache_ttl),
        }
    }

    async fn generate_ollama(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let response = self
            .client
            .post(format!("{}/api/embeddings", self.url))
            .json(&OllamaEmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await?
            .error_for_status()
            .map_err(EmbeddingError::Http)?
            .json::<OllamaEmbeddingResponse>()
            .await?;

        Ok(response.embedding)
    }

    async fn generate_openai(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| EmbeddingError::InvalidResponse("API key required".to_string()))?;

        let response = self
            .client
            .post(format!("{}/embeddings", self.url))
            .bearer_auth(api_key)
            .json(&OpenAiEmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await?
            .error_for_status()
            .map_err(EmbeddingError::Http)?
            .json::<OpenAiEmbeddingResponse>()
            .await?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::InvalidResponse("No embedding in response".to_string()))
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }
}

#[async_trait]
impl EmbeddingProvider for EmbeddingGenerator {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyText);
        }

        let key = TtlCache::<Vec<f32>>::make_key(&[&self.provider, &self.model, text]);
        if let Some(cached) = self.cache.get(&key) {
            debug!("Embedding cache HIT for: {}...", crate::safe_truncate(text, 50));
            return Ok(cached);
        }

        let embedding = match self.provider.as_str() {
            "ollama" => self.generate_ollama(text).await?,
            "openai" => self.generate_openai(text).await?,
            other => return Err(EmbeddingError::NotImplemented(other.to_string())),
        };

        if embedding.is_empty() {
            return Err(EmbeddingError::InvalidResponse("zero-length embedding".to_string()));
        }

        self.cache.set(&key, embedding.clone());
        Ok(embedding)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_text_rejected_before_any_request() {
        let generator = EmbeddingGenerator::new("openai", "text-embedding-3-small", None, None, 8, 60);
        assert!(matches!(generator.embed("   ").await, Err(EmbeddingError::EmptyText)));
    }

    #[tokio::test]
    async fn test_unknown_provider_is_not_implemented() {
        let generator = EmbeddingGenerator::new("cohere", "embed-v3", None, None, 8, 60);
        match generator.embed("fees").await {
            Err(EmbeddingError::NotImplemented(name)) => assert_eq!(name, "cohere"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_openai_requires_key() {
        let generator = EmbeddingGenerator::new("OpenAI", "text-embedding-3-small", None, None, 8, 60);
        assert_eq!(generator.provider(), "openai");
        assert!(matches!(
            generator.embed("scholarships").await,
            Err(EmbeddingError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_failed_lookups_count_as_misses_and_are_not_cached() {
        let generator = EmbeddingGenerator::new("cohere", "embed-v3", None, None, 8, 60);
        let _ = generator.embed("entry requirements").await;
        let _ = generator.embed("entry requirements").await;

        let stats = generator.cache_stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.size, 0);
    }
}
