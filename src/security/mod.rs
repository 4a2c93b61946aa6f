//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing to the gateway:
//!     → headers.rs (strip hop-by-hop, inject tenant identity)
//! Returning to the client:
//!     → headers.rs (allow-listed response headers only)
//! ```
//!
//! # Design Decisions
//! - No trust in client input: identity headers are always overwritten
//! - Response headers are allow-listed, never deny-listed

pub mod headers;
