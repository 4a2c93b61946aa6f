//! Request and result shapes of a forward call.

use std::sync::Arc;

use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use serde::Serialize;

use crate::config::GatewayConfig;
use crate::tenancy::TenantContext;
use crate::upstream::{FailureKind, ResponseData};

/// Methods the gateway accepts from this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Structured bodies are only transmitted for these methods.
    pub fn carries_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&Method> for HttpMethod {
    type Error = Method;

    fn try_from(method: &Method) -> Result<Self, Self::Error> {
        match *method {
            Method::GET => Ok(HttpMethod::Get),
            Method::POST => Ok(HttpMethod::Post),
            Method::PUT => Ok(HttpMethod::Put),
            Method::PATCH => Ok(HttpMethod::Patch),
            Method::DELETE => Ok(HttpMethod::Delete),
            _ => Err(method.clone()),
        }
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

/// An already-assembled multipart/form-data payload.
///
/// Treated as opaque: no placeholder substitution, no content-type
/// override, never retried.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartBody {
    /// Full content type including the boundary parameter.
    pub content_type: String,
    pub payload: Bytes,
}

/// Body of a forwarded request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Structured(serde_json::Value),
    Multipart(MultipartBody),
}

impl RequestBody {
    pub fn is_multipart(&self) -> bool {
        matches!(self, RequestBody::Multipart(_))
    }
}

/// Input to one forward call.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: HttpMethod,
    /// Gateway-relative path, identifiers already interpolated.
    pub path: String,
    pub body: RequestBody,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub tenant: Option<Arc<TenantContext>>,
    /// Caller identity.
    pub user_id: Option<String>,
}

impl ForwardRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
            headers: HeaderMap::new(),
            query: Vec::new(),
            tenant: None,
            user_id: None,
        }
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_tenant(mut self, tenant: impl Into<Arc<TenantContext>>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant.as_deref().map(|t| t.id.as_str())
    }
}

/// How a forward call terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// The gateway answered; its status is passed through whatever it is.
    Upstream,
    /// No response could be obtained; the result was synthesized.
    TransportError { kind: FailureKind, message: String },
}

/// Output of one forward call.
#[derive(Debug, Clone)]
pub struct ForwardResult {
    pub status: u16,
    pub status_text: String,
    pub data: ResponseData,
    /// Response headers eligible for re-exposure to the client.
    pub headers: HeaderMap,
    pub request_id: String,
    /// Wall-clock time for the whole call, retries included.
    pub duration_ms: u64,
    pub outcome: ForwardOutcome,
}

impl ForwardResult {
    /// True only when the call ended without any upstream response.
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ForwardOutcome::TransportError { .. })
    }
}

/// Process-wide forwarding policy, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwarderConfig {
    pub gateway_url: String,
    pub timeout_ms: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    pub max_body_bytes: usize,
    pub health_timeout_ms: u64,
    /// Value of the `{{environment}}` placeholder.
    pub environment: String,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self::from_gateway(&GatewayConfig::default(), "development")
    }
}

impl ForwarderConfig {
    pub fn from_gateway(gateway: &GatewayConfig, environment: impl Into<String>) -> Self {
        Self {
            gateway_url: gateway.url.clone(),
            timeout_ms: gateway.timeout_ms,
            retry_attempts: gateway.retry_attempts,
            retry_delay_ms: gateway.retry_delay_ms,
            max_body_bytes: gateway.max_body_bytes,
            health_timeout_ms: gateway.health_timeout_ms,
            environment: environment.into(),
        }
    }
}

/// Read-only snapshot of the forwarding policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwarderStats {
    pub api_gateway_url: String,
    pub timeout: u64,
    pub retry_attempts: u32,
    pub retry_delay: u64,
    pub max_file_size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_conversion() {
        assert_eq!(HttpMethod::try_from(&Method::PATCH), Ok(HttpMethod::Patch));
        assert_eq!(HttpMethod::try_from(&Method::HEAD), Err(Method::HEAD));
        assert_eq!(Method::from(HttpMethod::Delete), Method::DELETE);
    }

    #[test]
    fn test_carries_body() {
        assert!(HttpMethod::Post.carries_body());
        assert!(!HttpMethod::Get.carries_body());
        assert!(!HttpMethod::Delete.carries_body());
    }

    #[test]
    fn test_tenant_projection() {
        let request = ForwardRequest::new(HttpMethod::Get, "/x")
            .with_tenant(TenantContext::new("T1"))
            .with_user("u1");
        assert_eq!(request.tenant_id(), Some("T1"));
        assert_eq!(request.user_id.as_deref(), Some("u1"));
    }
}
