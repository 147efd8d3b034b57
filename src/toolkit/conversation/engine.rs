use std::sync::Arc;
use tracing::{debug, info, warn};

use super::composer::ResponseComposer;
use super::escalation::EscalationMonitor;
use super::models::{ChatRequest, ChatResponse};
use super::recommend::{
    CourseClassifier, FeatureMap, Recommendation, RecommendationService, RemoteCourseClassifier,
};
use crate::core::config::ConciergeConfig;
use crate::core::error::{ConciergeError, Result};
use crate::core::timeout::with_timeout;
use crate::llm::embeddings::EmbeddingProvider;
use crate::llm::factory::{EmbeddingProviderFactory, LlmProviderFactory};
use crate::llm::providers::base::LlmProvider;
use crate::llm::sentiment::{LlmSentimentScorer, SentimentScorer};
use crate::toolkit::retrieval::fuser::{RetrievalFuser, RetrievalResult};
use crate::toolkit::retrieval::index::{InMemoryVectorIndex, VectorIndex};
use crate::toolkit::retrieval::pinecone::PineconeIndex;
use crate::toolkit::routing::classifier::NamespaceClassifier;
use crate::toolkit::routing::intent::{Intent, IntentRouter};
use crate::toolkit::routing::partitions::PartitionRegistry;
use crate::toolkit::session::models::Sentiment;
use crate::toolkit::session::store::{InMemorySessionStore, SessionLocks, SessionStore};


/// External collaborators the engine is wired to.
pub struct EngineServices {
    pub llm: Arc<dyn LlmProvider>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub index: Arc<dyn VectorIndex>,
    pub sentiment: Arc<dyn SentimentScorer>,
    pub course_classifier: Arc<dyn CourseClassifier>,
    pub store: Arc<dyn SessionStore>,
}


/// Runs one conversational turn end to end: sentiment, escalation, intent,
/// retrieval or recommendation, composition, and the history write.
pub struct ConciergeEngine {
    store: Arc<dyn SessionStore>,
    locks: SessionLocks,
    sentiment: Arc<dyn SentimentScorer>,
    escalation: EscalationMonitor,
    intent: IntentRouter,
    classifier: NamespaceClassifier,
    fuser: RetrievalFuser,
    composer: ResponseComposer,
    recommender: RecommendationService,
    history_window: usize,
    timeout_secs: u64,
    apology_message: String,
}

impl ConciergeEngine {
    pub fn new(config: &ConciergeConfig, services: EngineServices) -> Result<Self> {
        config.validate()?;
        let registry = Arc::new(PartitionRegistry::from_config(config)?);
        let timeout_secs = config.external_timeout_secs;

        info!(
            "ConciergeEngine initialized: llm={}/{}, partitions={}, escalation_threshold={}",
            services.llm.provider_name(),
            services.llm.model_name(),
            registry.len(),
            config.escalation_threshold
        );

        Ok(Self {
            locks: SessionLocks::new(),
            sentiment: services.sentiment,
            escalation: EscalationMonitor::new(
                services.store.clone(),
                config.escalation_threshold,
                config.support_message.clone(),
            ),
            intent: IntentRouter::new(services.llm.clone(), timeout_secs),
            classifier: NamespaceClassifier::new(services.llm.clone(), registry.clone(), timeout_secs),
            fuser: RetrievalFuser::new(
                services.embedder,
                services.index,
                registry,
                config.fused_top_n,
                timeout_secs,
            ),
            composer: ResponseComposer::new(services.llm, timeout_secs),
            recommender: RecommendationService::new(services.course_classifier, timeout_secs),
            store: services.store,
            history_window: config.history_window,
            timeout_secs,
            apology_message: config.apology_message.clone(),
        })
    }

    /// Wires the live HTTP backends named in the configuration.
    pub fn from_config(config: &ConciergeConfig) -> Result<Self> {
        let llm = LlmProviderFactory::from_config(config)?;
        let embedder = Arc::new(EmbeddingProviderFactory::from_config(config)?);

        let index: Arc<dyn VectorIndex> = match &config.vector_index_host {
            Some(host) => {
                let api_key = config.vector_index_api_key.clone().ok_or_else(|| {
                    ConciergeError::Config("vector_index_api_key is required with a vector index host".into())
                })?;
                Arc::new(PineconeIndex::new(host, api_key)?)
            }
            None => {
                warn!("No vector index host configured, using an empty in-memory index");
                Arc::new(InMemoryVectorIndex::new())
            }
        };

        Self::new(
            config,
            EngineServices {
                sentiment: Arc::new(LlmSentimentScorer::new(llm.clone())),
                course_classifier: Arc::new(RemoteCourseClassifier::new(
                    config.recommendation_model_url.clone(),
                )),
                store: Arc::new(InMemorySessionStore::new()),
                llm,
                embedder,
                index,
            },
        )
    }

    /// Never fails: external faults become the apology reply, which is still recorded.
    pub async fn handle_turn(&self, request: &ChatRequest) -> ChatResponse {
        let session_id = request.session_id.as_str();
        let _guard = self.locks.acquire(session_id).await;
        info!(
            "Turn for session {}: '{}'",
            session_id,
            crate::safe_truncate_ellipsis(&request.user_query, 60)
        );

        match self.run_turn(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Turn failed for session {}: {}", session_id, e);
                if let Err(record_err) = self
                    .store
                    .record(session_id, &request.user_query, &self.apology_message)
                    .await
                {
                    warn!("Could not record apology for session {}: {}", session_id, record_err);
                }
                ChatResponse::text(self.apology_message.clone())
            }
        }
    }

    async fn run_turn(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let session_id = request.session_id.as_str();
        let query = request.user_query.as_str();

        let sentiment = with_timeout("sentiment scoring", self.timeout_secs, self.sentiment.score(query)).await?;
        self.store.record_sentiment(session_id, sentiment).await?;
        debug!("Session {} sentiment: {}", session_id, sentiment);

        if self.escalation.should_escalate(session_id).await? {
            let message = self.escalation.escalate(session_id, query).await?;
            return Ok(ChatResponse::text(message));
        }

        let features = request.features();
        let intent = self.intent.route(query, features.is_some()).await;
        debug!("Session {} intent: {:?}", session_id, intent);

        let response = match intent {
            Intent::Recommendation => ChatResponse::from(self.recommend(features).await?),
            Intent::Informational | Intent::Comparison => {
                ChatResponse::text(self.answer(session_id, query, sentiment).await?)
            }
        };

        self.store
            .record(session_id, query, response.response())
            .await?;
        Ok(response)
    }

    async fn recommend(&self, features: Option<&FeatureMap>) -> Result<Recommendation> {
        match self.recommender.recommend(features).await {
            Err(ConciergeError::Validation(reason)) => {
                info!("Rejected recommendation features: {}", reason);
                Ok(Recommendation::rejected(&reason))
            }
            other => other,
        }
    }

    async fn answer(&self, session_id: &str, query: &str, sentiment: Sentiment) -> Result<String> {
        let history = self.store.history(session_id, self.history_window).await?;
        let partitions = self.classifier.classify(query, &history).await;

        let retrieval = if partitions.is_empty() {
            debug!("No partition selected, skipping retrieval");
            RetrievalResult::default()
        } else {
            self.fuser.retrieve(query, &partitions).await?
        };

        let context = retrieval.context();
        self.composer
            .compose(
                context.as_deref(),
                query,
                &retrieval.render_sources(),
                sentiment,
                &history,
            )
            .await
    }
}
