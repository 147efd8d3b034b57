use async_trait::async_trait;
use thiserror::Error;


#[derive(Error, Debug)]
pub enum LlmProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Empty completion from {0}")]
    EmptyCompletion(String),
}


/// Which backend produced a completion. `fallback_error` is set when the
/// primary failed and this answer came from the fallback.
#[derive(Debug, Clone, Default)]
pub struct LlmMetadata {
    pub provider: String,
    pub model: String,
    pub fallback_error: Option<String>,
}

impl LlmMetadata {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            fallback_error: None,
        }
    }

    pub fn fallback_used(&self) -> bool {
        self.fallback_error.is_some()
    }
}


/// A chat-completion endpoint. Output is untrusted free text; callers validate it.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// `response_format` is the OpenAI `response_format.type` value, e.g. `json_object`.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        response_format: Option<&str>,
    ) -> Result<(String, LlmMetadata), LlmProviderError>;

    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;
}
