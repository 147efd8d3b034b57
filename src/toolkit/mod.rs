

pub mod conversation;
pub mod retrieval;
pub mod routing;
pub mod session;


pub use conversation::{ChatRequest, ChatResponse, ConciergeEngine};
