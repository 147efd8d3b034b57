

use serde::{Deserialize, Serialize};

use super::error::{ConciergeError, Result};


pub const DEFAULT_SUPPORT_MESSAGE: &str = "I'm sorry this has been frustrating. Let me hand you over to our team: \
email enquiries@nottingham.edu.my or call +60 3 8924 8000, Monday to Friday, 9:00am to 5:00pm (MYT). \
A member of staff will be glad to help you directly.";


pub const DEFAULT_APOLOGY_MESSAGE: &str = "I'm sorry, something went wrong while I was looking into that. \
Please try again shortly, or contact our team at enquiries@nottingham.edu.my or +60 3 8924 8000, \
Monday to Friday, 9:00am to 5:00pm (MYT).";


#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartitionDef {
    pub id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

impl PartitionDef {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            top_k: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }
}


#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConciergeConfig {

    pub llm_provider: String,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub llm_base_url: Option<String>,
    pub llm_temperature: f64,


    pub llm_fallback_enabled: bool,
    pub llm_fallback_url: String,
    pub llm_fallback_model: String,


    pub embedding_provider: String,
    pub embedding_model: String,
    pub embedding_url: String,
    pub embedding_api_key: Option<String>,
    pub embedding_cache_size: usize,
    pub embedding_cache_ttl: u64,


    pub vector_index_host: Option<String>,
    pub vector_index_api_key: Option<String>,


    pub recommendation_model_url: String,


    pub partitions: Vec<PartitionDef>,
    pub default_top_k: usize,
    pub fused_top_n: usize,
    pub history_window: usize,


    pub escalation_threshold: usize,
    pub external_timeout_secs: u64,
    pub support_message: String,
    pub apology_message: String,
}

impl ConciergeConfig {
    pub fn new() -> Self {
        Self {
            llm_provider: "openai".to_string(),
            llm_model: "gpt-4o-mini".to_string(),
            llm_api_key: None,
            llm_base_url: None,
            llm_temperature: 0.0,

            llm_fallback_enabled: false,
            llm_fallback_url: crate::DEFAULT_OLLAMA_URL.to_string(),
            llm_fallback_model: "llama3.2".to_string(),

            embedding_provider: "openai".to_string(),
            embedding_model: crate::DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_url: crate::DEFAULT_OLLAMA_URL.to_string(),
            embedding_api_key: None,
            embedding_cache_size: crate::DEFAULT_CACHE_SIZE,
            embedding_cache_ttl: crate::DEFAULT_CACHE_TTL,

            vector_index_host: None,
            vector_index_api_key: None,

            recommendation_model_url: "http://localhost:8500".to_string(),

            partitions: default_partitions(),
            default_top_k: 3,
            fused_top_n: 3,
            history_window: 5,

            escalation_threshold: 2,
            external_timeout_secs: 30,
            support_message: DEFAULT_SUPPORT_MESSAGE.to_string(),
            apology_message: DEFAULT_APOLOGY_MESSAGE.to_string(),
        }
    }

    /// Layers defaults, an optional TOML file named by `CONCIERGE_CONFIG`, and
    /// `CONCIERGE_*` environment variables, in that order of precedence. Nested
    /// keys use `__`. Unset keys then fall back to `OPENAI_API_KEY`,
    /// `PINECONE_API_KEY` and `PINECONE_INDEX_HOST`.
    pub fn load() -> Result<Self> {
        let defaults = config::Config::try_from(&Self::new())
            .map_err(|e| ConciergeError::Config(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Ok(path) = std::env::var("CONCIERGE_CONFIG") {
            builder = builder.add_source(config::File::with_name(&path).required(true));
        }

        let mut loaded: Self = builder
            .add_source(
                config::Environment::with_prefix("CONCIERGE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConciergeError::Config(e.to_string()))?;

        loaded.apply_key_fallbacks(|name| std::env::var(name).ok());
        loaded.validate()?;
        Ok(loaded)
    }

    /// Fills credentials and the index host from the provider-standard variables
    /// when the `CONCIERGE_*` layer left them unset.
    fn apply_key_fallbacks(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.llm_api_key.get_or_insert_with(|| key.clone());
            self.embedding_api_key.get_or_insert(key);
        }
        if self.vector_index_api_key.is_none() {
            self.vector_index_api_key = lookup("PINECONE_API_KEY");
        }
        if self.vector_index_host.is_none() {
            self.vector_index_host = lookup("PINECONE_INDEX_HOST");
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.partitions.is_empty() {
            return Err(ConciergeError::Config("at least one partition must be configured".into()));
        }
        if self.fused_top_n == 0 || self.default_top_k == 0 {
            return Err(ConciergeError::Config("top-k and top-n must be positive".into()));
        }
        if self.escalation_threshold == 0 {
            return Err(ConciergeError::Config("escalation_threshold must be positive".into()));
        }
        if self.external_timeout_secs == 0 {
            return Err(ConciergeError::Config("external_timeout_secs must be positive".into()));
        }
        let mut seen = std::collections::HashSet::new();
        for partition in &self.partitions {
            if partition.id.trim().is_empty() {
                return Err(ConciergeError::Config("partition id cannot be empty".into()));
            }
            if !seen.insert(partition.id.as_str()) {
                return Err(ConciergeError::Config(format!(
                    "duplicate partition id: {}",
                    partition.id
                )));
            }
        }
        Ok(())
    }
}

impl Default for ConciergeConfig {
    fn default() -> Self {
        Self::new()
    }
}


pub fn default_partitions() -> Vec<PartitionDef> {
    vec![
        PartitionDef::new(
            "nottingham-foundation-programme",
            "Foundation programme details including entry requirements for foundation-level students. \
             The Nottingham Foundation Programme is a pre-university course that prepares students for \
             undergraduate study at the University of Nottingham Malaysia, building academic and \
             subject-specific skills. Students must meet the entry requirements of their chosen degree.",
        ),
        PartitionDef::new(
            "computer-science-bsc-hons",
            "Undergraduate computer science programme details, including entry requirements, course structure, and modules.",
        ),
        PartitionDef::new(
            "computer-science-with-artificial-intelligence-bsc-hons",
            "Undergraduate AI-focused computer science programme details, including entry requirements, course structure, and modules.",
        ),
        PartitionDef::new(
            "computer-science-mphil-phd",
            "Postgraduate computer science research programme details.",
        )
        .with_top_k(1),
        PartitionDef::new(
            "Foundation-undergraduate-scholarships",
            "Information about foundation and undergraduate scholarships available at the university.",
        ),
    ]
}
