

pub mod classifier;
pub mod intent;
pub mod partitions;
pub mod prompt;

pub use classifier::NamespaceClassifier;
pub use intent::{Intent, IntentRouter};
pub use partitions::{Partition, PartitionId, PartitionRegistry};
