

pub mod models;
pub mod store;

pub use models::{Sentiment, SessionState, Turn};
pub use store::{InMemorySessionStore, SessionLocks, SessionStore};
