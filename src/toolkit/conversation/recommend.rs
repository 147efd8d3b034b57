use async_trait::async_trait;
use lazy_static::lazy_static;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::error::{ConciergeError, Result};
use crate::core::timeout::with_timeout;
use crate::utils::round_to;


pub type FeatureMap = BTreeMap<String, String>;
pub type FeatureMenu = BTreeMap<String, Vec<String>>;

lazy_static! {
    /// Feature columns of the trained course model and the values it was trained on.
    static ref FEATURE_OPTIONS: Vec<(&'static str, Vec<&'static str>)> = vec![
        ("MathsAptitude", vec!["low", "medium", "high"]),
        ("Interest", vec!["General computer science", "AI", "research and advanced studies"]),
        ("HighestQualification", vec!["high school", "college", "diploma", "degree"]),
        ("ComputerScienceRelated", vec!["Yes", "No"]),
    ];
}


pub fn feature_menu() -> FeatureMenu {
    FEATURE_OPTIONS
        .iter()
        .map(|(name, values)| {
            (
                name.to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            )
        })
        .collect()
}

/// Every recognised feature must be present with one of its trained values, and nothing else.
pub fn validate_features(features: &FeatureMap) -> Result<FeatureMap> {
    for key in features.keys() {
        if !FEATURE_OPTIONS.iter().any(|(name, _)| name == key) {
            return Err(ConciergeError::Validation(format!("unrecognised feature '{key}'")));
        }
    }

    let mut cleaned = FeatureMap::new();
    for (name, values) in FEATURE_OPTIONS.iter() {
        let Some(value) = features.get(*name).map(|v| v.trim()) else {
            return Err(ConciergeError::Validation(format!("missing feature '{name}'")));
        };
        if !values.contains(&value) {
            return Err(ConciergeError::Validation(format!(
                "'{value}' is not a valid {name}; expected one of: {}",
                values.join(", ")
            )));
        }
        cleaned.insert(name.to_string(), value.to_string());
    }
    Ok(cleaned)
}


/// Output of the trained model: `classes` and `probabilities` are index-aligned in the
/// model's own label order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoursePrediction {
    pub predicted: String,
    pub classes: Vec<String>,
    pub probabilities: Vec<f64>,
}


#[async_trait]
pub trait CourseClassifier: Send + Sync {
    async fn predict(&self, features: &FeatureMap) -> Result<CoursePrediction>;
}


/// Trained course model served over HTTP at `{base_url}/predict`.
pub struct RemoteCourseClassifier {
    base_url: String,
    client: Client,
}

impl RemoteCourseClassifier {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("RemoteCourseClassifier initialized (url={})", base_url);
        Self {
            base_url,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl CourseClassifier for RemoteCourseClassifier {
    async fn predict(&self, features: &FeatureMap) -> Result<CoursePrediction> {
        let prediction = self
            .client
            .post(format!("{}/predict", self.base_url))
            .json(features)
            .send()
            .await?
            .error_for_status()?
            .json::<CoursePrediction>()
            .await?;
        Ok(prediction)
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseScore {
    pub course: String,
    /// Percentage, rounded to two decimal places.
    pub probability: f64,
}


#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub courses: Vec<CourseScore>,
    pub response: String,
    pub feature_menu: Option<FeatureMenu>,
}

impl Recommendation {
    pub fn menu_only(response: impl Into<String>) -> Self {
        Self {
            courses: Vec::new(),
            response: response.into(),
            feature_menu: Some(feature_menu()),
        }
    }

    /// Menu reply for features that failed validation.
    pub fn rejected(reason: &str) -> Self {
        Self::menu_only(format!("I couldn't use those details: {reason}. {}", menu_prompt()))
    }
}


pub struct RecommendationService {
    classifier: Arc<dyn CourseClassifier>,
    timeout_secs: u64,
}

impl RecommendationService {
    pub fn new(classifier: Arc<dyn CourseClassifier>, timeout_secs: u64) -> Self {
        Self {
            classifier,
            timeout_secs,
        }
    }

    /// Without features this only returns the menu; it never predicts from partial input.
    pub async fn recommend(&self, features: Option<&FeatureMap>) -> Result<Recommendation> {
        let Some(features) = features else {
            return Ok(Recommendation::menu_only(menu_prompt()));
        };

        let features = validate_features(features)?;
        let prediction = with_timeout(
            "course recommendation",
            self.timeout_secs,
            self.classifier.predict(&features),
        )
        .await?;

        if prediction.classes.len() != prediction.probabilities.len() || prediction.classes.is_empty() {
            warn!(
                "Course model returned {} classes and {} probabilities",
                prediction.classes.len(),
                prediction.probabilities.len()
            );
            return Err(ConciergeError::Recommendation(
                "classes and probabilities are misaligned".into(),
            ));
        }

        let courses: Vec<CourseScore> = prediction
            .classes
            .iter()
            .zip(&prediction.probabilities)
            .map(|(course, p)| CourseScore {
                course: course.clone(),
                probability: round_to(p * 100.0, 2),
            })
            .collect();

        info!("Recommended course: {}", prediction.predicted);
        Ok(Recommendation {
            response: render_prediction(&prediction.predicted, &courses),
            courses,
            feature_menu: None,
        })
    }
}

fn render_prediction(predicted: &str, courses: &[CourseScore]) -> String {
    let mut text = format!("Recommended course: {predicted}\nPercentage match for each course:");
    for score in courses {
        text.push_str(&format!("\n- {}: {:.2}%", score.course, score.probability));
    }
    text
}

fn menu_prompt() -> String {
    let options = FEATURE_OPTIONS
        .iter()
        .map(|(name, values)| format!("{name} ({})", values.join(", ")))
        .collect::<Vec<_>>()
        .join("; ");
    format!("To recommend a course, please choose one option for each of: {options}.")
}
