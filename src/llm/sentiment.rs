
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::error::{ConciergeError, Result};
use crate::llm::providers::base::LlmProvider;
use crate::toolkit::session::models::Sentiment;


#[async_trait]
pub trait SentimentScorer: Send + Sync {
    async fn score(&self, utterance: &str) -> Result<Sentiment>;
}


pub const SENTIMENT_SYSTEM_PROMPT: &str = "You classify the sentiment of a message sent to a university \
enquiry assistant. Answer with exactly one word: positive, neutral, or negative. \
Frustration, anger, and complaints about not getting help are negative.";


/// Sentiment scoring through a chat model. An unrecognised label counts as neutral;
/// a failed call is an error the turn must handle.
pub struct LlmSentimentScorer {
    llm: Arc<dyn LlmProvider>,
}

impl LlmSentimentScorer {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

pub fn parse_sentiment(raw: &str) -> Sentiment {
    let token = raw
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c == '`')
        .trim();
    match Sentiment::from_str(token) {
        Ok(sentiment) => sentiment,
        Err(_) => {
            debug!("Unrecognised sentiment label '{}', using neutral", crate::safe_truncate(raw, 40));
            Sentiment::Neutral
        }
    }
}

#[async_trait]
impl SentimentScorer for LlmSentimentScorer {
    async fn score(&self, utterance: &str) -> Result<Sentiment> {
        let (raw, _) = self
            .llm
            .generate(SENTIMENT_SYSTEM_PROMPT, &format!("Message: {utterance}"), None)
            .await
            .map_err(|e| {
                warn!("Sentiment scoring failed: {}", e);
                ConciergeError::Sentiment(e.to_string())
            })?;
        Ok(parse_sentiment(&raw))
    }
}
