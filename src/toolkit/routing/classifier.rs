use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::partitions::{Partition, PartitionRegistry};
use super::prompt::{build_namespace_system_prompt, build_namespace_user_prompt};
use crate::core::timeout::with_timeout;
use crate::llm::providers::base::LlmProvider;
use crate::toolkit::session::models::Turn;


pub const MAX_HISTORY_TURNS: usize = 5;

lazy_static! {
    static ref TOKEN_SEPARATOR: Regex = Regex::new(r"[,;\n]+").expect("separator pattern is valid");
}


/// Maps a query to the configured partitions a chat model says it concerns.
///
/// Best effort: a failed or timed-out call and an answer without a single valid id both
/// yield an empty selection, which callers read as "no relevant partition".
pub struct NamespaceClassifier {
    llm: Arc<dyn LlmProvider>,
    registry: Arc<PartitionRegistry>,
    timeout_secs: u64,
}

impl NamespaceClassifier {
    pub fn new(llm: Arc<dyn LlmProvider>, registry: Arc<PartitionRegistry>, timeout_secs: u64) -> Self {
        info!(
            "NamespaceClassifier initialized: provider={}, partitions={}",
            llm.provider_name(),
            registry.len()
        );
        Self {
            llm,
            registry,
            timeout_secs,
        }
    }

    pub async fn classify(&self, query: &str, history: &[Turn]) -> Vec<Partition> {
        let window = &history[history.len().saturating_sub(MAX_HISTORY_TURNS)..];
        let system_prompt = build_namespace_system_prompt(&self.registry, window);
        let user_prompt = build_namespace_user_prompt(query);

        let call = self.llm.generate(&system_prompt, &user_prompt, None);
        let raw = match with_timeout("namespace classification", self.timeout_secs, call).await {
            Ok((raw, _)) => raw,
            Err(e) => {
                warn!("Namespace classification failed, treating as no match: {}", e);
                return Vec::new();
            }
        };

        let selected = self.parse_selection(&raw);
        if selected.is_empty() {
            debug!(
                "Classifier returned no valid namespace: '{}'",
                crate::safe_truncate(&raw, 120)
            );
        } else {
            info!(
                "Selected namespaces: {:?}",
                selected.iter().map(|p| p.id.as_str()).collect::<Vec<_>>()
            );
        }
        selected
    }

    /// Keeps only tokens that name a configured partition, deduplicated, in registry order.
    pub fn parse_selection(&self, raw: &str) -> Vec<Partition> {
        let mut hits: Vec<(usize, &Partition)> = TOKEN_SEPARATOR
            .split(raw)
            .map(normalize_token)
            .filter(|token| !token.is_empty())
            .filter_map(|token| self.registry.resolve(token))
            .filter_map(|p| self.registry.position(&p.id).map(|pos| (pos, p)))
            .collect();

        hits.sort_by_key(|(pos, _)| *pos);
        hits.dedup_by_key(|(pos, _)| *pos);
        hits.into_iter().map(|(_, p)| p.clone()).collect()
    }
}

fn normalize_token(token: &str) -> &str {
    token
        .trim()
        .trim_matches(|c: char| c == '\'' || c == '"' || c == '`' || c == '.' || c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::default_partitions;
    use crate::testing::ScriptedLlm;
    use std::time::Duration;

    fn registry() -> Arc<PartitionRegistry> {
        Arc::new(PartitionRegistry::new(&default_partitions(), 3).unwrap())
    }

    fn ids(selection: &[Partition]) -> Vec<&str> {
        selection.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_valid_ids_are_returned() {
        let llm = Arc::new(ScriptedLlm::constant(
            "computer-science-with-artificial-intelligence-bsc-hons",
        ));
        let classifier = NamespaceClassifier::new(llm, registry(), 5);
        let selection = classifier
            .classify("What are the entry requirements for the AI computer science degree?", &[])
            .await;
        assert_eq!(ids(&selection), vec!["computer-science-with-artificial-intelligence-bsc-hons"]);
    }

    #[tokio::test]
    async fn test_hallucinated_ids_are_dropped() {
        let llm = Arc::new(ScriptedLlm::constant(
            "computer-science-bsc-hons, law-llb-hons, Foundation-undergraduate-scholarships",
        ));
        let classifier = NamespaceClassifier::new(llm, registry(), 5);
        let selection = classifier.classify("scholarships for CS?", &[]).await;
        assert_eq!(
            ids(&selection),
            vec!["computer-science-bsc-hons", "Foundation-undergraduate-scholarships"]
        );
    }

    #[test]
    fn test_parse_normalizes_quotes_newlines_and_duplicates() {
        let classifier = NamespaceClassifier::new(Arc::new(ScriptedLlm::failing()), registry(), 5);
        let raw = "'computer-science-mphil-phd'\n`nottingham-foundation-programme`.,computer-science-mphil-phd";
        assert_eq!(
            ids(&classifier.parse_selection(raw)),
            vec!["nottingham-foundation-programme", "computer-science-mphil-phd"]
        );
        assert!(classifier.parse_selection("NONE").is_empty());
        assert!(classifier.parse_selection("").is_empty());
    }

    #[tokio::test]
    async fn test_failure_yields_empty_selection() {
        let classifier = NamespaceClassifier::new(Arc::new(ScriptedLlm::failing()), registry(), 5);
        assert!(classifier.classify("fees?", &[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_timeout_yields_empty_selection() {
        let llm = Arc::new(
            ScriptedLlm::constant("computer-science-bsc-hons").with_delay(Duration::from_secs(3)),
        );
        let classifier = NamespaceClassifier::new(llm, registry(), 1);
        assert!(classifier.classify("modules?", &[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_only_last_five_turns_reach_prompt() {
        let llm = Arc::new(ScriptedLlm::constant("computer-science-bsc-hons"));
        let classifier = NamespaceClassifier::new(llm.clone(), registry(), 5);
        let history: Vec<Turn> = (1..=7)
            .map(|i| Turn::new(format!("question {i}"), format!("answer {i}")))
            .collect();

        classifier.classify("and what about that course?", &history).await;

        let (system, user) = llm.last_call().unwrap();
        assert!(!system.contains("question 2\n"));
        assert!(system.contains("question 3\n"));
        assert!(system.contains("question 7\n"));
        assert_eq!(user, "User query: and what about that course?");
    }
}
