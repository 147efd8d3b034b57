use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use super::index::{Passage, VectorIndex};
use crate::core::error::Result;
use crate::core::timeout::with_timeout;
use crate::llm::embeddings::EmbeddingProvider;
use crate::toolkit::routing::partitions::{Partition, PartitionRegistry};


#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetrievalResult {
    pub passages: Vec<Passage>,
    pub sources: Vec<String>,
}

impl RetrievalResult {
    /// Passage texts in rank order, or `None` when nothing was retrieved.
    pub fn context(&self) -> Option<String> {
        if self.passages.is_empty() {
            return None;
        }
        Some(
            self.passages
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    /// Markdown link list of the citation set; empty when there are no links.
    pub fn render_sources(&self) -> String {
        self.sources
            .iter()
            .map(|url| format!("- [{url}]({url})"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}


pub struct RetrievalFuser {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    registry: Arc<PartitionRegistry>,
    top_n: usize,
    timeout_secs: u64,
}

impl RetrievalFuser {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        registry: Arc<PartitionRegistry>,
        top_n: usize,
        timeout_secs: u64,
    ) -> Self {
        info!(
            "RetrievalFuser initialized: embedding_model={}, top_n={}",
            embedder.model_name(),
            top_n
        );
        Self {
            embedder,
            index,
            registry,
            top_n,
            timeout_secs,
        }
    }

    /// Embeds the query once, searches every partition concurrently, and keeps the
    /// `top_n` best passages across all of them.
    pub async fn retrieve(&self, query: &str, partitions: &[Partition]) -> Result<RetrievalResult> {
        if partitions.is_empty() {
            return Ok(RetrievalResult::default());
        }

        let mut ordered: Vec<&Partition> = partitions.iter().collect();
        ordered.sort_by_key(|p| self.registry.position(&p.id).unwrap_or(usize::MAX));
        ordered.dedup_by(|a, b| a.id == b.id);

        let vector = with_timeout("query embedding", self.timeout_secs, self.embedder.embed(query)).await?;

        let lookups = ordered.iter().map(|partition| {
            with_timeout(
                "vector search",
                self.timeout_secs,
                self.index.query(partition, &vector, partition.top_k),
            )
        });

        let mut candidates = Vec::new();
        for (partition, outcome) in ordered.iter().zip(join_all(lookups).await) {
            let passages = outcome?;
            debug!("Partition {}: {} passages", partition.id, passages.len());
            candidates.extend(passages);
        }

        Ok(fuse(candidates, self.top_n))
    }
}

/// Stable descending sort by score, so equal scores keep partition order; then
/// de-duplication by partition and text, then truncation.
pub fn fuse(candidates: Vec<Passage>, top_n: usize) -> RetrievalResult {
    let mut candidates: Vec<Passage> = candidates
        .into_iter()
        .filter(|p| p.similarity_score.is_finite())
        .collect();
    candidates.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));

    let mut seen = HashSet::new();
    let passages: Vec<Passage> = candidates
        .into_iter()
        .filter(|p| seen.insert((p.partition.clone(), p.text.clone())))
        .take(top_n)
        .collect();

    let mut sources: Vec<String> = Vec::new();
    for url in passages.iter().filter_map(|p| p.source_url.as_deref()) {
        let url = url.trim();
        if !url.is_empty() && !sources.iter().any(|s| s == url) {
            sources.push(url.to_string());
        }
    }

    RetrievalResult { passages, sources }
}
