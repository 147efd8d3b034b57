use std::sync::Arc;
use tracing::debug;

use super::prompt::{build_answer_prompt, build_no_match_prompt, PERSONA_PROMPT};
use crate::core::error::{ConciergeError, Result};
use crate::core::timeout::with_timeout;
use crate::llm::providers::base::{LlmProvider, LlmProviderError};
use crate::toolkit::session::models::{Sentiment, Turn};


pub struct ResponseComposer {
    llm: Arc<dyn LlmProvider>,
    timeout_secs: u64,
}

impl ResponseComposer {
    pub fn new(llm: Arc<dyn LlmProvider>, timeout_secs: u64) -> Self {
        Self { llm, timeout_secs }
    }

    /// One generation call. With `context` the answer is grounded on it; without, the
    /// reduced prompt admits that no record matched.
    pub async fn compose(
        &self,
        context: Option<&str>,
        query: &str,
        sources: &str,
        sentiment: Sentiment,
        history: &[Turn],
    ) -> Result<String> {
        let prompt = match context {
            Some(context) => build_answer_prompt(context, query, sources, sentiment, history),
            None => {
                debug!("Composing without context (no matching record)");
                build_no_match_prompt(query, sentiment, history)
            }
        };

        let call = self.llm.generate(PERSONA_PROMPT, &prompt, None);
        let (answer, metadata) = with_timeout("response generation", self.timeout_secs, call).await?;
        debug!(
            "Generated {} chars via {}/{}",
            answer.len(),
            metadata.provider,
            metadata.model
        );

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(ConciergeError::LlmProvider(LlmProviderError::EmptyCompletion(
                self.llm.provider_name().to_string(),
            )));
        }
        Ok(answer.to_string())
    }
}
