//! Multi-tenant frontend proxy.
//!
//! Relays browser-facing API calls to an internal API Gateway on behalf of
//! a tenant: strips hop-by-hop headers, injects tenant and identity
//! headers, substitutes `{{placeholders}}`, retries transient failures and
//! normalizes the outcome into one `ForwardResult` shape.

pub mod config;
pub mod forwarder;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod security;
pub mod tenancy;
pub mod upstream;

pub use config::AppConfig;
pub use forwarder::{ForwardRequest, ForwardResult, Forwarder, ForwarderConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
