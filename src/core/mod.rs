

pub mod config;
pub mod error;
pub mod timeout;

pub use config::{ConciergeConfig, PartitionDef, DEFAULT_APOLOGY_MESSAGE, DEFAULT_SUPPORT_MESSAGE};
pub use error::{ConciergeError, Result};
pub use timeout::with_timeout;
