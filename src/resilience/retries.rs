//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether a failed attempt may be re-issued
//! - Execute attempts sequentially with linear backoff
//! - Stop after the configured number of attempts
//!
//! # Design Decisions
//! - Multipart bodies are never replayed
//! - Reset, timeout and DNS failures retry; refused connections do not
//! - Any 5xx retries regardless of method, so a non-idempotent write that
//!   partially applied upstream may be applied twice
//! - 4xx and unclassified failures are terminal after the first attempt

use std::future::Future;
use std::time::Duration;

use crate::observability::metrics;
use crate::resilience::backoff::linear_delay;
use crate::resilience::timeouts::with_deadline;
use crate::upstream::{FailureKind, TransportError, UpstreamResponse};

/// Attempt budget and pacing for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay_step: Duration,
    pub attempt_timeout: Duration,
}

/// Why an attempt did not produce a final answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    Transport(FailureKind),
    ServerError(u16),
}

impl RetryReason {
    fn of(result: &Result<UpstreamResponse, TransportError>) -> Option<Self> {
        match result {
            Ok(response) if response.is_server_error() => {
                Some(RetryReason::ServerError(response.status))
            }
            Ok(_) => None,
            Err(err) => Some(RetryReason::Transport(err.kind)),
        }
    }

    pub fn label(self) -> String {
        match self {
            RetryReason::Transport(kind) => kind.code().to_string(),
            RetryReason::ServerError(status) => status.to_string(),
        }
    }
}

/// Eligibility rule, evaluated in order: multipart never, then the
/// transient kinds and 5xx, everything else terminal.
pub fn is_retryable(multipart: bool, reason: RetryReason) -> bool {
    if multipart {
        return false;
    }
    match reason {
        RetryReason::Transport(kind) => matches!(
            kind,
            FailureKind::ConnectionReset | FailureKind::Timeout | FailureKind::HostNotFound
        ),
        RetryReason::ServerError(status) => status >= 500,
    }
}

/// Final result of the attempt loop.
#[derive(Debug)]
pub struct RetryOutcome {
    pub result: Result<UpstreamResponse, TransportError>,
    pub attempts: u32,
}

/// Run `attempt` until it succeeds, fails terminally, or the budget is spent.
///
/// `attempt` receives the 1-indexed attempt number. Attempts never overlap.
/// When the budget is spent on 5xx answers the last answer is returned.
pub async fn execute_with_retry<F, Fut>(
    policy: RetryPolicy,
    multipart: bool,
    request_id: &str,
    mut attempt: F,
) -> RetryOutcome
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<UpstreamResponse, TransportError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut current = 1;

    loop {
        let result = with_deadline(policy.attempt_timeout, attempt(current)).await;

        match RetryReason::of(&result) {
            Some(reason) if current < max_attempts && is_retryable(multipart, reason) => {
                let delay = linear_delay(current, policy.delay_step);
                tracing::warn!(
                    request_id = %request_id,
                    attempt = current,
                    max_attempts,
                    reason = %reason.label(),
                    error = result.as_ref().err().map(|e| e.message.as_str()).unwrap_or(""),
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Request failed, retrying"
                );
                metrics::record_retry(&reason.label());
                tokio::time::sleep(delay).await;
                current += 1;
            }
            _ => {
                return RetryOutcome {
                    result,
                    attempts: current,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::ResponseData;
    use axum::http::HeaderMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay_step: Duration::from_millis(1),
            attempt_timeout: Duration::from_millis(500),
        }
    }

    fn response(status: u16) -> UpstreamResponse {
        UpstreamResponse {
            status,
            status_text: String::new(),
            headers: HeaderMap::new(),
            body: ResponseData::Text(String::new()),
        }
    }

    #[test]
    fn test_eligibility_order() {
        let reset = RetryReason::Transport(FailureKind::ConnectionReset);
        assert!(is_retryable(false, reset));
        assert!(!is_retryable(true, reset));
        assert!(!is_retryable(true, RetryReason::ServerError(503)));

        assert!(is_retryable(false, RetryReason::Transport(FailureKind::Timeout)));
        assert!(is_retryable(false, RetryReason::Transport(FailureKind::HostNotFound)));
        assert!(is_retryable(false, RetryReason::ServerError(500)));
        assert!(!is_retryable(false, RetryReason::Transport(FailureKind::ConnectionRefused)));
        assert!(!is_retryable(false, RetryReason::Transport(FailureKind::Other)));
        assert!(!is_retryable(false, RetryReason::Transport(FailureKind::BodyTooLarge)));
    }

    #[tokio::test]
    async fn test_recovers_after_server_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let outcome = execute_with_retry(policy(3), false, "req_1", move |_| {
            let c = c.clone();
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Ok(response(503))
                } else {
                    Ok(response(200))
                }
            }
        })
        .await;

        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.result.unwrap().status, 200);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let outcome = execute_with_retry(policy(3), false, "req_1", |_| async { Ok(response(404)) }).await;
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.result.unwrap().status, 404);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_server_error() {
        let outcome = execute_with_retry(policy(2), false, "req_1", |n| async move {
            Ok(response(500 + n as u16))
        })
        .await;
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.result.unwrap().status, 502);
    }

    #[tokio::test]
    async fn test_attempt_numbers_are_sequential() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let s = seen.clone();
        let outcome = execute_with_retry(policy(4), false, "req_1", move |n| {
            s.lock().unwrap().push(n);
            async { Err(TransportError::new(FailureKind::ConnectionReset, "reset")) }
        })
        .await;
        assert_eq!(outcome.attempts, 4);
        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(outcome.result.unwrap_err().kind, FailureKind::ConnectionReset);
    }

    #[tokio::test]
    async fn test_slow_attempts_time_out_and_retry() {
        let policy = RetryPolicy {
            max_attempts: 2,
            delay_step: Duration::from_millis(1),
            attempt_timeout: Duration::from_millis(20),
        };
        let outcome = execute_with_retry(policy, false, "req_1", |_| async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok(response(200))
        })
        .await;
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.result.unwrap_err().kind, FailureKind::Timeout);
    }
}
