

pub mod composer;
pub mod engine;
pub mod escalation;
pub mod models;
pub mod prompt;
pub mod recommend;

pub use composer::ResponseComposer;
pub use engine::{ConciergeEngine, EngineServices};
pub use escalation::EscalationMonitor;
pub use models::{ChatRequest, ChatResponse};
pub use recommend::{
    CourseClassifier, CoursePrediction, CourseScore, Recommendation, RecommendationService,
    RemoteCourseClassifier,
};
