use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

use super::models::{Sentiment, SessionState, Turn};
use crate::core::error::Result;


/// Per-session turn history and mood trace. An unknown session id reads as empty.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn record(&self, session_id: &str, user_utterance: &str, bot_response: &str) -> Result<()>;

    /// The most recent `limit` turns, oldest first.
    async fn history(&self, session_id: &str, limit: usize) -> Result<Vec<Turn>>;

    async fn record_sentiment(&self, session_id: &str, sentiment: Sentiment) -> Result<()>;

    async fn recent_sentiments(&self, session_id: &str) -> Result<Vec<Sentiment>>;

    async fn reset_sentiments(&self, session_id: &str) -> Result<()>;
}


#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionState>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn record(&self, session_id: &str, user_utterance: &str, bot_response: &str) -> Result<()> {
        let mut sessions = self.sessions.write();
        let state = sessions.entry(session_id.to_string()).or_default();
        state.turns.push(Turn::new(user_utterance, bot_response));
        debug!("Recorded turn #{} for session {}", state.turns.len(), session_id);
        Ok(())
    }

    async fn history(&self, session_id: &str, limit: usize) -> Result<Vec<Turn>> {
        let sessions = self.sessions.read();
        let Some(state) = sessions.get(session_id) else {
            return Ok(Vec::new());
        };
        let start = state.turns.len().saturating_sub(limit);
        Ok(state.turns[start..].to_vec())
    }

    async fn record_sentiment(&self, session_id: &str, sentiment: Sentiment) -> Result<()> {
        self.sessions
            .write()
            .entry(session_id.to_string())
            .or_default()
            .mood_trace
            .push(sentiment);
        Ok(())
    }

    async fn recent_sentiments(&self, session_id: &str) -> Result<Vec<Sentiment>> {
        Ok(self
            .sessions
            .read()
            .get(session_id)
            .map(|s| s.mood_trace.clone())
            .unwrap_or_default())
    }

    async fn reset_sentiments(&self, session_id: &str) -> Result<()> {
        if let Some(state) = self.sessions.write().get_mut(session_id) {
            state.mood_trace.clear();
            debug!("Mood trace cleared for session {}", session_id);
        }
        Ok(())
    }
}


/// One async mutex per session id, so at most one turn per session runs at a time.
#[derive(Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .lock()
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
