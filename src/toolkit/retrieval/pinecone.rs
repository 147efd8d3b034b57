use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use super::index::{Passage, VectorIndex, VectorIndexError};
use crate::toolkit::routing::partitions::Partition;


#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    namespace: &'a str,
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    #[serde(default)]
    id: String,
    score: f64,
    #[serde(default)]
    metadata: Option<MatchMetadata>,
}

#[derive(Deserialize, Default)]
struct MatchMetadata {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    source_url: Option<String>,
}


/// Pinecone data-plane client; each partition maps to a Pinecone namespace.
pub struct PineconeIndex {
    query_url: Url,
    api_key: String,
    client: Client,
}

impl PineconeIndex {
    pub fn new(host: &str, api_key: impl Into<String>) -> Result<Self, VectorIndexError> {
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{host}")
        };
        let query_url = Url::parse(&host)
            .and_then(|base| base.join("query"))
            .map_err(|e| VectorIndexError::Endpoint(format!("{host}: {e}")))?;

        info!("PineconeIndex initialized (endpoint={})", query_url);
        Ok(Self {
            query_url,
            api_key: api_key.into(),
            client: Client::new(),
        })
    }

    pub fn query_url(&self) -> &Url {
        &self.query_url
    }
}

fn into_passage(partition: &Partition, found: QueryMatch) -> Option<Passage> {
    let metadata = found.metadata.unwrap_or_default();
    let Some(text) = metadata.content.or(metadata.text).filter(|t| !t.trim().is_empty()) else {
        debug!("Skipping match {} without content in {}", found.id, partition.id);
        return None;
    };
    Some(Passage {
        partition: partition.id.clone(),
        text,
        similarity_score: found.score,
        source_url: metadata.source_url.filter(|u| !u.trim().is_empty()),
    })
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn query(
        &self,
        partition: &Partition,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<Passage>, VectorIndexError> {
        let response = self
            .client
            .post(self.query_url.clone())
            .header("Api-Key", &self.api_key)
            .json(&QueryRequest {
                namespace: partition.id.as_str(),
                vector,
                top_k,
                include_metadata: true,
            })
            .send()
            .await?
            .error_for_status()?
            .json::<QueryResponse>()
            .await?;

        let passages: Vec<Passage> = response
            .matches
            .into_iter()
            .filter_map(|m| into_passage(partition, m))
            .collect();

        debug!("Pinecone namespace {}: {} passages", partition.id, passages.len());
        Ok(passages)
    }
}
