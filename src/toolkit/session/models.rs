use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, IntoStaticStr, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Default for Sentiment {
    fn default() -> Self {
        Self::Neutral
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub user_utterance: String,
    pub bot_response: String,
    pub recorded_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(user_utterance: impl Into<String>, bot_response: impl Into<String>) -> Self {
        Self {
            user_utterance: user_utterance.into(),
            bot_response: bot_response.into(),
            recorded_at: Utc::now(),
        }
    }
}


#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub turns: Vec<Turn>,
    pub mood_trace: Vec<Sentiment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_sentiment_parses_case_insensitively() {
        assert_eq!(Sentiment::from_str("NEGATIVE").unwrap(), Sentiment::Negative);
        assert_eq!(Sentiment::from_str("positive").unwrap(), Sentiment::Positive);
        assert!(Sentiment::from_str("angry").is_err());
    }

    #[test]
    fn test_sentiment_wire_format() {
        assert_eq!(serde_json::to_string(&Sentiment::Neutral).unwrap(), "\"neutral\"");
        let label: &'static str = Sentiment::Negative.into();
        assert_eq!(label, "negative");
        assert_eq!(Sentiment::Positive.to_string(), "positive");
    }
}
