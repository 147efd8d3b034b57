use serde::{Deserialize, Serialize};

use super::recommend::{CourseScore, FeatureMap, FeatureMenu, Recommendation};


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub user_query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_features: Option<FeatureMap>,
}

impl ChatRequest {
    pub fn new(session_id: impl Into<String>, user_query: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            user_query: user_query.into(),
            user_features: None,
        }
    }

    pub fn with_features(mut self, features: FeatureMap) -> Self {
        self.user_features = Some(features);
        self
    }

    /// An empty feature map counts as no features.
    pub fn features(&self) -> Option<&FeatureMap> {
        self.user_features.as_ref().filter(|f| !f.is_empty())
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatResponse {
    Recommendation {
        courses: Vec<CourseScore>,
        response: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feature_selection: Option<FeatureMenu>,
    },
    Informational {
        response: String,
    },
}

impl ChatResponse {
    pub fn text(response: impl Into<String>) -> Self {
        Self::Informational {
            response: response.into(),
        }
    }

    pub fn response(&self) -> &str {
        match self {
            Self::Recommendation { response, .. } | Self::Informational { response } => response,
        }
    }
}

impl From<Recommendation> for ChatResponse {
    fn from(rec: Recommendation) -> Self {
        Self::Recommendation {
            courses: rec.courses,
            response: rec.response,
            feature_selection: rec.feature_menu,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_without_features() {
        let request: ChatRequest =
            serde_json::from_value(json!({"session_id": "abc", "user_query": "hello"})).unwrap();
        assert_eq!(request.session_id, "abc");
        assert!(request.features().is_none());

        let empty: ChatRequest = serde_json::from_value(
            json!({"session_id": "abc", "user_query": "hello", "user_features": {}}),
        )
        .unwrap();
        assert!(empty.features().is_none());
    }

    #[test]
    fn test_informational_shape() {
        let value = serde_json::to_value(ChatResponse::text("Hi there")).unwrap();
        assert_eq!(value, json!({"response": "Hi there"}));
    }

    #[test]
    fn test_recommendation_shape_omits_absent_menu() {
        let response = ChatResponse::Recommendation {
            courses: vec![CourseScore {
                course: "Computer Science BSc".into(),
                probability: 81.5,
            }],
            response: "Recommended course: Computer Science BSc".into(),
            feature_selection: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "courses": [{"course": "Computer Science BSc", "probability": 81.5}],
                "response": "Recommended course: Computer Science BSc"
            })
        );
    }

    #[test]
    fn test_menu_only_recommendation_carries_selection() {
        let response = ChatResponse::from(Recommendation::menu_only("Pick one of each"));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["courses"], json!([]));
        assert_eq!(value["feature_selection"]["ComputerScienceRelated"], json!(["Yes", "No"]));
        assert_eq!(response.response(), "Pick one of each");
    }
}
