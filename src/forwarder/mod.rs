//! Request forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! ForwardRequest
//!     → security::headers (strip hop-by-hop, inject tenant identity)
//!     → placeholders.rs (substitute body and query)
//!     → encoding.rs (JSON or form fields, matching Content-Type)
//!     → target.rs (gateway url + path + query)
//!     → resilience::retries (attempts with linear backoff)
//!     → classify.rs (gateway answered, any status)
//!       | errors.rs (no answer: synthesized error)
//!     → ForwardResult
//! ```
//!
//! # Design Decisions
//! - `forward` never fails; every path ends in a `ForwardResult`
//! - The request id is minted once per call and reused by every attempt
//! - Configuration is immutable and shared; calls hold no other shared state

pub mod classify;
pub mod encoding;
pub mod errors;
pub mod placeholders;
pub mod target;
pub mod types;

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap};
use bytes::Bytes;
use uuid::Uuid;

use crate::health::gateway::{probe_gateway, HealthReport};
use crate::observability::metrics;
use crate::resilience::{execute_with_retry, RetryOutcome, RetryPolicy};
use crate::security::headers::{prepare_headers, IdentityContext};
use crate::tenancy::TenantContext;
use crate::upstream::{HttpTransport, OutboundRequest, ResponseKind, TransportError, UpstreamTransport};

pub use types::{
    ForwardOutcome, ForwardRequest, ForwardResult, ForwarderConfig, ForwarderStats, HttpMethod,
    MultipartBody, RequestBody,
};

/// Relays requests to the API Gateway on behalf of a tenant.
///
/// Cheap to clone; clones share the transport's connection pool.
#[derive(Clone)]
pub struct Forwarder {
    config: Arc<ForwarderConfig>,
    transport: Arc<dyn UpstreamTransport>,
}

impl Forwarder {
    pub fn new(config: ForwarderConfig, transport: Arc<dyn UpstreamTransport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    /// Forwarder over the pooled HTTP client.
    pub fn with_http_transport(
        config: ForwarderConfig,
        connect_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(connect_timeout)?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn config(&self) -> &ForwarderConfig {
        &self.config
    }

    pub fn stats(&self) -> ForwarderStats {
        ForwarderStats {
            api_gateway_url: self.config.gateway_url.clone(),
            timeout: self.config.timeout_ms,
            retry_attempts: self.config.retry_attempts,
            retry_delay: self.config.retry_delay_ms,
            max_file_size: self.config.max_body_bytes,
        }
    }

    /// Probe the gateway's `/health` path, outside the retry policy.
    pub async fn health_check(&self) -> HealthReport {
        probe_gateway(
            self.transport.as_ref(),
            &self.config.gateway_url,
            Duration::from_millis(self.config.health_timeout_ms),
        )
        .await
    }

    /// Relay one request and return the gateway's answer or a synthesized error.
    pub async fn forward(&self, request: ForwardRequest) -> ForwardResult {
        let started = Instant::now();
        let request_id = generate_request_id();

        let ForwardRequest {
            method,
            path,
            body,
            headers,
            query,
            tenant,
            user_id,
        } = request;
        let tenant = tenant.as_deref();
        let multipart = body.is_multipart();

        tracing::info!(
            request_id = %request_id,
            tenant_id = tenant.map(|t| t.id.as_str()).unwrap_or(""),
            user_id = user_id.as_deref().unwrap_or(""),
            method = %method,
            path = %path,
            multipart,
            "Forwarding request to API Gateway"
        );

        let mut prepared = prepare_headers(
            &headers,
            &body,
            IdentityContext {
                tenant,
                user_id: user_id.as_deref(),
                request_id: &request_id,
            },
        );
        let query = placeholders::substitute_query(query, tenant, &self.config.environment);
        let url = target::build_target_url(&self.config.gateway_url, &path, &query);
        let accept = headers.get(header::ACCEPT).and_then(|v| v.to_str().ok());
        let response_kind = if target::wants_binary(&path, accept) {
            ResponseKind::Binary
        } else {
            ResponseKind::Decoded
        };

        let outcome = match self.encode_body(method, body, tenant, &mut prepared) {
            Ok(payload) => {
                let outbound = OutboundRequest {
                    method: method.into(),
                    url,
                    headers: prepared,
                    body: payload,
                    response_kind,
                    max_response_bytes: self.config.max_body_bytes,
                };
                let transport = self.transport.as_ref();
                execute_with_retry(self.retry_policy(), multipart, &request_id, |_| {
                    transport.send(outbound.clone())
                })
                .await
            }
            Err(err) => RetryOutcome {
                result: Err(err),
                attempts: 0,
            },
        };

        let elapsed = started.elapsed();
        let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

        match outcome.result {
            Ok(response) => {
                tracing::info!(
                    request_id = %request_id,
                    tenant_id = tenant.map(|t| t.id.as_str()).unwrap_or(""),
                    status = response.status,
                    duration_ms,
                    attempts = outcome.attempts,
                    content_type = response
                        .headers
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or(""),
                    "Request forwarded successfully"
                );
                metrics::record_forward(response.status, "upstream", elapsed);
                classify::from_upstream(response, request_id, duration_ms)
            }
            Err(err) => {
                tracing::error!(
                    request_id = %request_id,
                    tenant_id = tenant.map(|t| t.id.as_str()).unwrap_or(""),
                    error = %err.message,
                    code = err.kind.code(),
                    duration_ms,
                    attempts = outcome.attempts,
                    "Request forwarding failed"
                );
                let result = errors::from_transport_error(err, request_id, duration_ms);
                metrics::record_forward(result.status, "transport_error", elapsed);
                result
            }
        }
    }

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.config.retry_attempts,
            delay_step: Duration::from_millis(self.config.retry_delay_ms),
            attempt_timeout: Duration::from_millis(self.config.timeout_ms),
        }
    }

    /// Encode the outgoing payload once; every attempt replays the same bytes.
    fn encode_body(
        &self,
        method: HttpMethod,
        body: RequestBody,
        tenant: Option<&TenantContext>,
        headers: &mut HeaderMap,
    ) -> Result<Option<Bytes>, TransportError> {
        let payload = match body {
            RequestBody::Empty => None,
            RequestBody::Multipart(multipart) => Some(multipart.payload),
            RequestBody::Structured(value) if method.carries_body() && !value.is_null() => {
                let value = placeholders::substitute_value(value, tenant, &self.config.environment);
                let encoded = encoding::encode_structured(&value, headers).map_err(|e| {
                    TransportError::new(crate::upstream::FailureKind::Other, e.to_string())
                })?;
                Some(encoded)
            }
            RequestBody::Structured(_) => None,
        };

        match payload {
            Some(bytes) if bytes.len() > self.config.max_body_bytes => {
                Err(TransportError::body_too_large(self.config.max_body_bytes))
            }
            payload => Ok(payload),
        }
    }
}

fn generate_request_id() -> String {
    format!("req_{}", Uuid::new_v4().simple())
}
