

pub mod cache;
pub mod fuser;
pub mod index;
pub mod pinecone;

pub use cache::{CacheStats, TtlCache};
pub use fuser::{RetrievalFuser, RetrievalResult};
pub use index::{InMemoryVectorIndex, Passage, VectorIndex, VectorIndexError};
pub use pinecone::PineconeIndex;
