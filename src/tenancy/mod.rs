//! Tenant subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → resolver.rs (x-tenant-id header, else host domain)
//!     → TenantContext attached as request extension
//!     → forwarding handler reads it into the ForwardRequest
//! ```

pub mod context;
pub mod resolver;

pub use context::TenantContext;
pub use resolver::{tenant_middleware, TenantRegistry};
