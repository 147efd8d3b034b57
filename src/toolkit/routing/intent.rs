use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use strum::{EnumString, IntoStaticStr};
use tracing::{debug, warn};

use super::prompt::INTENT_SYSTEM_PROMPT;
use crate::core::timeout::with_timeout;
use crate::llm::providers::base::LlmProvider;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, IntoStaticStr)]
pub enum Intent {
    #[strum(serialize = "course_info")]
    #[serde(rename = "course_info")]
    Informational,
    /// Reserved: routed like `Informational` until comparison answers exist.
    #[strum(serialize = "course_comparison")]
    #[serde(rename = "course_comparison")]
    Comparison,
    #[strum(serialize = "recommendation")]
    #[serde(rename = "recommendation")]
    Recommendation,
}

impl Default for Intent {
    fn default() -> Self {
        Self::Informational
    }
}


pub struct IntentRouter {
    llm: Arc<dyn LlmProvider>,
    timeout_secs: u64,
}

impl IntentRouter {
    pub fn new(llm: Arc<dyn LlmProvider>, timeout_secs: u64) -> Self {
        Self { llm, timeout_secs }
    }

    pub async fn route(&self, query: &str, structured_features_present: bool) -> Intent {
        if structured_features_present {
            debug!("Structured features supplied, routing to recommendation");
            return Intent::Recommendation;
        }

        let user_prompt = format!("User query: {query}");
        let call = self.llm.generate(INTENT_SYSTEM_PROMPT, &user_prompt, None);
        match with_timeout("intent classification", self.timeout_secs, call).await {
            Ok((raw, _)) => parse_intent(&raw),
            Err(e) => {
                warn!("Intent classification failed, defaulting to course_info: {}", e);
                Intent::default()
            }
        }
    }
}

/// Exact match after trimming and lower-casing; anything else is `Informational`.
pub fn parse_intent(raw: &str) -> Intent {
    let token = raw.trim().to_lowercase();
    Intent::from_str(&token).unwrap_or_else(|_| {
        debug!("Unrecognised intent '{}', defaulting to course_info", crate::safe_truncate(raw, 60));
        Intent::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedLlm;
    use std::time::Duration;

    #[test]
    fn test_parse_intent_exact_tokens() {
        assert_eq!(parse_intent("course_info"), Intent::Informational);
        assert_eq!(parse_intent(" Recommendation\n"), Intent::Recommendation);
        assert_eq!(parse_intent("course_comparison"), Intent::Comparison);
    }

    #[test]
    fn test_parse_intent_defaults_on_anything_else() {
        assert_eq!(parse_intent("I think it's a recommendation"), Intent::Informational);
        assert_eq!(parse_intent("'recommendation'"), Intent::Informational);
        assert_eq!(parse_intent(""), Intent::Informational);
    }

    #[tokio::test]
    async fn test_features_short_circuit_without_model_call() {
        let llm = Arc::new(ScriptedLlm::constant("course_info"));
        let router = IntentRouter::new(llm.clone(), 5);
        assert_eq!(router.route("anything", true).await, Intent::Recommendation);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_model_answer_is_used() {
        let router = IntentRouter::new(Arc::new(ScriptedLlm::constant("recommendation")), 5);
        assert_eq!(
            router.route("Which course suits someone who loves maths?", false).await,
            Intent::Recommendation
        );
    }

    #[tokio::test]
    async fn test_model_failure_defaults_to_informational() {
        let router = IntentRouter::new(Arc::new(ScriptedLlm::failing()), 5);
        assert_eq!(router.route("fees?", false).await, Intent::Informational);
    }

    #[tokio::test]
    async fn test_model_timeout_defaults_to_informational() {
        let llm = ScriptedLlm::constant("recommendation").with_delay(Duration::from_secs(3));
        let router = IntentRouter::new(Arc::new(llm), 1);
        assert_eq!(
            router.route("Which course should I take?", false).await,
            Intent::Informational
        );
    }
}
