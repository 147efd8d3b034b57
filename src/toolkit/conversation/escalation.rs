use std::sync::Arc;
use tracing::{debug, info};

use crate::core::error::Result;
use crate::toolkit::session::models::Sentiment;
use crate::toolkit::session::store::SessionStore;


/// Hands a session to human support once enough negative turns pile up.
pub struct EscalationMonitor {
    store: Arc<dyn SessionStore>,
    threshold: usize,
    support_message: String,
}

impl EscalationMonitor {
    pub fn new(store: Arc<dyn SessionStore>, threshold: usize, support_message: impl Into<String>) -> Self {
        Self {
            store,
            threshold: threshold.max(1),
            support_message: support_message.into(),
        }
    }

    pub async fn should_escalate(&self, session_id: &str) -> Result<bool> {
        let negatives = self
            .store
            .recent_sentiments(session_id)
            .await?
            .into_iter()
            .filter(|s| *s == Sentiment::Negative)
            .count();
        debug!("Session {} negative count: {}/{}", session_id, negatives, self.threshold);
        Ok(negatives >= self.threshold)
    }

    /// Records the support hand-off as this turn's reply and clears the mood trace.
    pub async fn escalate(&self, session_id: &str, user_utterance: &str) -> Result<String> {
        self.store
            .record(session_id, user_utterance, &self.support_message)
            .await?;
        self.store.reset_sentiments(session_id).await?;
        info!("Session {} escalated to human support", session_id);
        Ok(self.support_message.clone())
    }
}
