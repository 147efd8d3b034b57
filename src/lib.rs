

pub mod core;
pub mod llm;
pub mod toolkit;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use utils::{safe_truncate, safe_truncate_ellipsis};


pub use core::config::ConciergeConfig;
pub use core::error::{ConciergeError, Result};
pub use llm::embeddings::EmbeddingGenerator;
pub use toolkit::conversation::{ChatRequest, ChatResponse, ConciergeEngine, EngineServices};


pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";


pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";


pub const DEFAULT_CACHE_SIZE: usize = 1000;


pub const DEFAULT_CACHE_TTL: u64 = 300;
