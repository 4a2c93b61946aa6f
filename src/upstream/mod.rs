//! Upstream transport subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarder (one call)
//!     → OutboundRequest (method, absolute url, prepared headers, encoded body)
//!     → UpstreamTransport::send (one attempt)
//!     → UpstreamResponse | TransportError
//! ```
//!
//! # Design Decisions
//! - Any HTTP status is a successful transport outcome; only failures below
//!   the HTTP layer become `TransportError`
//! - The transport is a trait so retry behavior can be exercised without a network
//! - Bodies are fully buffered and capped; exceeding the cap is a failure

pub mod client;
pub mod error;

use async_trait::async_trait;
use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;

pub use client::HttpTransport;
pub use error::{FailureKind, TransportError};

/// How the response body should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Keep the raw bytes (downloads, octet streams).
    Binary,
    /// Decode as JSON when possible, else text.
    Decoded,
}

/// A single fully-prepared attempt.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    pub response_kind: ResponseKind,
    pub max_response_bytes: usize,
}

/// What the upstream sent back.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: ResponseData,
}

impl UpstreamResponse {
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

/// Reason phrase for a status code, empty when unknown.
pub fn reason_phrase(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or_default()
        .to_string()
}

/// Response payload as seen by callers.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    Json(serde_json::Value),
    Text(String),
    Binary(Bytes),
}

impl ResponseData {
    /// Interpret a buffered body according to the negotiated kind.
    ///
    /// Decoded bodies are parsed as JSON when they parse, otherwise kept as
    /// text; an empty body becomes empty text.
    pub fn decode(kind: ResponseKind, bytes: Bytes) -> Self {
        match kind {
            ResponseKind::Binary => ResponseData::Binary(bytes),
            ResponseKind::Decoded => {
                if bytes.is_empty() {
                    return ResponseData::Text(String::new());
                }
                match serde_json::from_slice(&bytes) {
                    Ok(value) => ResponseData::Json(value),
                    Err(_) => ResponseData::Text(String::from_utf8_lossy(&bytes).into_owned()),
                }
            }
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseData::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// One network attempt against the gateway.
#[async_trait]
pub trait UpstreamTransport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, TransportError>;
}
