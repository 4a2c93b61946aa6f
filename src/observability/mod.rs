//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarder, retry loop, health probe produce:
//!     → logging.rs (structured tracing events keyed by request_id)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout log aggregation
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
