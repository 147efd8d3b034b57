//! Deterministic stand-ins for the external services, shared by the unit tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::core::error::{ConciergeError, Result};
use crate::llm::embeddings::{EmbeddingError, EmbeddingProvider};
use crate::llm::providers::base::{LlmMetadata, LlmProvider, LlmProviderError};
use crate::llm::sentiment::SentimentScorer;
use crate::toolkit::conversation::recommend::{CourseClassifier, CoursePrediction, FeatureMap};
use crate::toolkit::retrieval::index::{Passage, VectorIndex, VectorIndexError};
use crate::toolkit::routing::partitions::Partition;
use crate::toolkit::session::models::Sentiment;


type Script = Box<dyn Fn(&str, &str) -> std::result::Result<String, String> + Send + Sync>;

/// Chat model whose answer is computed from `(system, user)` by a closure.
pub struct ScriptedLlm {
    script: Script,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedLlm {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&str, &str) -> std::result::Result<String, String> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn constant(answer: &str) -> Self {
        let answer = answer.to_string();
        Self::new(move |_, _| Ok(answer.clone()))
    }

    pub fn failing() -> Self {
        Self::new(|_, _| Err("scripted outage".to_string()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn last_call(&self) -> Option<(String, String)> {
        self.calls.lock().last().cloned()
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        _response_format: Option<&str>,
    ) -> std::result::Result<(String, LlmMetadata), LlmProviderError> {
        self.calls
            .lock()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let answer = (self.script)(system_prompt, user_prompt).map_err(LlmProviderError::Provider)?;
        Ok((answer, LlmMetadata::new("scripted", "scripted-model")))
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}


/// Returns the same small vector for every text and counts calls.
#[derive(Default)]
pub struct FixedEmbedder {
    calls: AtomicUsize,
}

impl FixedEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyText);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![1.0, 0.0, 0.0])
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}


struct StaticHit {
    text: String,
    score: f64,
    source_url: Option<String>,
}

/// Index with canned hits per partition id; ignores the query vector.
#[derive(Default)]
pub struct StaticIndex {
    hits: HashMap<String, Vec<StaticHit>>,
    failing: HashSet<String>,
    delays: HashMap<String, Duration>,
    requested: Mutex<HashMap<String, usize>>,
    completed: Mutex<Vec<String>>,
    queries: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl StaticIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, partition: &str, text: &str, score: f64, source_url: Option<&str>) -> Self {
        self.hits.entry(partition.to_string()).or_default().push(StaticHit {
            text: text.to_string(),
            score,
            source_url: source_url.map(String::from),
        });
        self
    }

    pub fn failing_on(mut self, partition: &str) -> Self {
        self.failing.insert(partition.to_string());
        self
    }

    /// Makes lookups on `partition` answer only after `delay`.
    pub fn delayed(mut self, partition: &str, delay: Duration) -> Self {
        self.delays.insert(partition.to_string(), delay);
        self
    }

    /// Partition ids in the order their lookups finished.
    pub fn completion_order(&self) -> Vec<String> {
        self.completed.lock().clone()
    }

    /// Highest number of lookups that were running at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn requested_top_k(&self, partition: &str) -> Option<usize> {
        self.requested.lock().get(partition).copied()
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorIndex for StaticIndex {
    async fn query(
        &self,
        partition: &Partition,
        _vector: &[f32],
        top_k: usize,
    ) -> std::result::Result<Vec<Passage>, VectorIndexError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.requested
            .lock()
            .insert(partition.id.as_str().to_string(), top_k);

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(partition.id.as_str()) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.lock().push(partition.id.as_str().to_string());

        if self.failing.contains(partition.id.as_str()) {
            return Err(VectorIndexError::Malformed(format!(
                "scripted failure for {}",
                partition.id
            )));
        }

        let mut passages: Vec<Passage> = self
            .hits
            .get(partition.id.as_str())
            .map(|hits| {
                hits.iter()
                    .map(|hit| Passage {
                        partition: partition.id.clone(),
                        text: hit.text.clone(),
                        similarity_score: hit.score,
                        source_url: hit.source_url.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        passages.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
        passages.truncate(top_k);
        Ok(passages)
    }
}


/// Labels utterances by keyword: anything mentioning "frustrated" or "useless" is negative.
#[derive(Default)]
pub struct KeywordSentiment {
    failing: bool,
}

impl KeywordSentiment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { failing: true }
    }
}

#[async_trait]
impl SentimentScorer for KeywordSentiment {
    async fn score(&self, utterance: &str) -> Result<Sentiment> {
        if self.failing {
            return Err(ConciergeError::Sentiment("scripted outage".into()));
        }
        let lower = utterance.to_lowercase();
        if lower.contains("frustrated") || lower.contains("useless") {
            Ok(Sentiment::Negative)
        } else if lower.contains("thanks") || lower.contains("great") {
            Ok(Sentiment::Positive)
        } else {
            Ok(Sentiment::Neutral)
        }
    }
}


pub struct FixedCourseClassifier {
    prediction: CoursePrediction,
    calls: AtomicUsize,
}

impl FixedCourseClassifier {
    pub fn new(prediction: CoursePrediction) -> Self {
        Self {
            prediction,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CourseClassifier for FixedCourseClassifier {
    async fn predict(&self, _features: &FeatureMap) -> Result<CoursePrediction> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.prediction.clone())
    }
}
