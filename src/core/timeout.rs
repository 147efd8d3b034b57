

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use super::error::{ConciergeError, Result};


/// Runs one call to an external collaborator under a deadline.
///
/// An elapsed deadline becomes [`ConciergeError::Timeout`], so callers apply the same
/// failure policy to a hung collaborator as to one that answered with an error.
pub async fn with_timeout<T, E, F>(operation: &str, seconds: u64, call: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    E: Into<ConciergeError>,
{
    match tokio::time::timeout(Duration::from_secs(seconds), call).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => {
            warn!("{} exceeded {}s deadline", operation, seconds);
            Err(ConciergeError::timeout(operation, seconds))
        }
    }
}
