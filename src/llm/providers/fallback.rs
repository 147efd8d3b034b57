use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use super::base::{LlmMetadata, LlmProvider, LlmProviderError};


/// Routes to `primary`, retrying the same prompt once on `fallback` when the primary errors.
pub struct LlmProviderWithFallback {
    primary: Arc<dyn LlmProvider>,
    fallback: Option<Arc<dyn LlmProvider>>,
    using_fallback: AtomicBool,
    fallback_count: AtomicUsize,
    primary_failures: AtomicUsize,
}

impl LlmProviderWithFallback {
    pub fn new(primary: Arc<dyn LlmProvider>, fallback: Option<Arc<dyn LlmProvider>>) -> Self {
        info!(
            "LlmProviderWithFallback initialized: primary={}, fallback={}",
            primary.provider_name(),
            fallback
                .as_ref()
                .map(|f| format!("{}/{}", f.provider_name(), f.model_name()))
                .unwrap_or_else(|| "disabled".to_string())
        );

        Self {
            primary,
            fallback,
            using_fallback: AtomicBool::new(false),
            fallback_count: AtomicUsize::new(0),
            primary_failures: AtomicUsize::new(0),
        }
    }

    pub fn is_using_fallback(&self) -> bool {
        self.using_fallback.load(Ordering::SeqCst)
    }

    pub fn fallback_count(&self) -> usize {
        self.fallback_count.load(Ordering::SeqCst)
    }

    pub fn primary_failures(&self) -> usize {
        self.primary_failures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for LlmProviderWithFallback {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        response_format: Option<&str>,
    ) -> Result<(String, LlmMetadata), LlmProviderError> {
        let error = match self.primary.generate(system_prompt, user_prompt, response_format).await {
            Ok(ok) => {
                self.using_fallback.store(false, Ordering::SeqCst);
                self.primary_failures.store(0, Ordering::SeqCst);
                return Ok(ok);
            }
            Err(e) => e,
        };

        let failures = self.primary_failures.fetch_add(1, Ordering::SeqCst) + 1;
        warn!("Primary LLM provider failed ({}x): {}", failures, error);

        let Some(fallback) = &self.fallback else {
            return Err(error);
        };

        let (content, mut metadata) = fallback
            .generate(system_prompt, user_prompt, response_format)
            .await?;

        metadata.fallback_error = Some(error.to_string());
        self.using_fallback.store(true, Ordering::SeqCst);
        let total = self.fallback_count.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Fallback successful via {} (total_fallbacks={})", fallback.provider_name(), total);

        Ok((content, metadata))
    }

    fn provider_name(&self) -> &str {
        match (&self.fallback, self.is_using_fallback()) {
            (Some(fallback), true) => fallback.provider_name(),
            _ => self.primary.provider_name(),
        }
    }

    fn model_name(&self) -> &str {
        match (&self.fallback, self.is_using_fallback()) {
            (Some(fallback), true) => fallback.model_name(),
            _ => self.primary.model_name(),
        }
    }
}
