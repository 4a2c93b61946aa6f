//! Timeout enforcement.
//!
//! Every gateway call has a deadline; an elapsed deadline is reported as a
//! `Timeout` transport failure, distinct from other errors.

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;

use crate::upstream::TransportError;

/// Run one attempt under `limit`.
pub async fn with_deadline<T, F>(limit: Duration, attempt: F) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    match timeout(limit, attempt).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::timeout(
            u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        )),
    }
}
