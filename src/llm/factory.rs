

use std::sync::Arc;

use super::embeddings::EmbeddingGenerator;
use super::providers::base::LlmProvider;
use super::providers::fallback::LlmProviderWithFallback;
use super::providers::ollama::OllamaProvider;
use super::providers::openai::OpenAiProvider;
use crate::core::config::ConciergeConfig;
use crate::core::error::{ConciergeError, Result};


pub struct LlmProviderFactory;

impl LlmProviderFactory {
    pub fn create(
        provider: &str,
        model: &str,
        api_key: Option<&str>,
        base_url: Option<&str>,
        temperature: f64,
    ) -> Result<Arc<dyn LlmProvider>> {
        match provider {
            "openai" => {
                let api_key = api_key.filter(|k| !k.is_empty()).ok_or_else(|| {
                    ConciergeError::Config("openai provider requires an API key".into())
                })?;
                Ok(Arc::new(OpenAiProvider::new(
                    api_key,
                    model,
                    base_url.map(String::from),
                    temperature,
                )))
            }
            "ollama" => Ok(Arc::new(match base_url {
                Some(url) => OllamaProvider::new(url, model, temperature),
                None => OllamaProvider::localhost(model, temperature),
            })),
            _ => Err(ConciergeError::Config(format!(
                "Unknown provider: {provider}. Supported: openai, ollama"
            ))),
        }
    }

    /// The configured primary, wrapped with a local Ollama fallback when enabled.
    pub fn from_config(config: &ConciergeConfig) -> Result<Arc<dyn LlmProvider>> {
        let primary = Self::create(
            &config.llm_provider,
            &config.llm_model,
            config.llm_api_key.as_deref(),
            config.llm_base_url.as_deref(),
            config.llm_temperature,
        )?;

        if !config.llm_fallback_enabled {
            return Ok(primary);
        }

        let fallback: Arc<dyn LlmProvider> = Arc::new(OllamaProvider::new(
            config.llm_fallback_url.clone(),
            config.llm_fallback_model.clone(),
            config.llm_temperature,
        ));
        Ok(Arc::new(LlmProviderWithFallback::new(primary, Some(fallback))))
    }
}


pub struct EmbeddingProviderFactory;

impl EmbeddingProviderFactory {
    pub fn from_config(config: &ConciergeConfig) -> Result<EmbeddingGenerator> {
        let url = match config.embedding_provider.as_str() {
            "ollama" => Some(config.embedding_url.clone()),
            "openai" => None,
            other => {
                return Err(ConciergeError::Config(format!(
                    "Unknown embedding provider: {other}. Supported: openai, ollama"
                )))
            }
        };

        Ok(EmbeddingGenerator::new(
            config.embedding_provider.clone(),
            config.embedding_model.clone(),
            url,
            config.embedding_api_key.clone(),
            config.embedding_cache_size,
            config.embedding_cache_ttl,
        ))
    }
}
