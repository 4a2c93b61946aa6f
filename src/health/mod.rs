//! Health reporting subsystem.
//!
//! # Data Flow
//! ```text
//! GET /health          → liveness of this server (http::server)
//! GET /health/gateway  → gateway.rs probe → HealthReport
//! ```
//!
//! # Design Decisions
//! - The gateway probe is on demand; nothing polls in the background
//! - Probe results are not cached and never influence `forward()`

pub mod gateway;

pub use gateway::{probe_gateway, HealthReport, HealthStatus};
