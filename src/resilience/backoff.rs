//! Linear backoff.

use std::time::Duration;

/// Delay before re-issuing after failed attempt `attempt` (1-indexed):
/// `step * attempt`.
pub fn linear_delay(attempt: u32, step: Duration) -> Duration {
    step.saturating_mul(attempt)
}
