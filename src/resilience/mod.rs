//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Attempt against the gateway:
//!     → timeouts.rs (per-attempt deadline)
//!     → On failure: retries.rs (check eligibility, wait per backoff.rs)
//!     → Next attempt, strictly after the previous one finished
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every attempt has a deadline
//! - The attempt counter is an explicit loop variable
//! - Worst case latency is attempts × timeout plus the summed backoff

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{execute_with_retry, is_retryable, RetryOutcome, RetryPolicy, RetryReason};
pub use timeouts::with_deadline;
