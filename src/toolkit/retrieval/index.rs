use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::toolkit::routing::partitions::{Partition, PartitionId};


#[derive(Error, Debug)]
pub enum VectorIndexError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid index endpoint: {0}")]
    Endpoint(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Dimension mismatch: index holds {expected}, query has {actual}")]
    Dimension { expected: usize, actual: usize },
}


#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Passage {
    pub partition: PartitionId,
    pub text: String,
    pub similarity_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}


/// Nearest-neighbour search scoped to one partition. Read-only per query.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn query(
        &self,
        partition: &Partition,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<Passage>, VectorIndexError>;
}


struct StoredVector {
    vector: Vec<f32>,
    text: String,
    source_url: Option<String>,
}


/// Brute-force cosine index held in memory, keyed by partition id.
#[derive(Default)]
pub struct InMemoryVectorIndex {
    partitions: RwLock<HashMap<String, Vec<StoredVector>>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(
        &self,
        partition: &str,
        vector: Vec<f32>,
        text: impl Into<String>,
        source_url: Option<String>,
    ) {
        let text = text.into();
        let mut partitions = self.partitions.write();
        let entries = partitions.entry(partition.to_string()).or_default();
        entries.retain(|e| e.text != text);
        entries.push(StoredVector {
            vector,
            text,
            source_url,
        });
    }

    pub fn len(&self, partition: &str) -> usize {
        self.partitions.read().get(partition).map_or(0, Vec::len)
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a < f32::EPSILON || norm_b < f32::EPSILON {
        0.0
    } else {
        f64::from(dot / (norm_a * norm_b))
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn query(
        &self,
        partition: &Partition,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<Passage>, VectorIndexError> {
        let partitions = self.partitions.read();
        let Some(entries) = partitions.get(partition.id.as_str()) else {
            return Ok(Vec::new());
        };

        if let Some(first) = entries.first() {
            if first.vector.len() != vector.len() {
                return Err(VectorIndexError::Dimension {
                    expected: first.vector.len(),
                    actual: vector.len(),
                });
            }
        }

        let mut scored: Vec<Passage> = entries
            .iter()
            .map(|e| Passage {
                partition: partition.id.clone(),
                text: e.text.clone(),
                similarity_score: cosine_similarity(&e.vector, vector),
                source_url: e.source_url.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
        scored.truncate(top_k);
        Ok(scored)
    }
}
