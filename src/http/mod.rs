//! HTTP host subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, CORS, tracing, body limit)
//!     → tenancy middleware (resolve tenant, attach extension)
//!     → request.rs (ForwardRequest from method, path, query, body)
//!     → Forwarder::forward
//!     → response.rs (filtered headers, X-Request-ID, X-Response-Time)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{extract_forward_request, RequestRejection};
pub use server::{AppState, HttpServer};
