//! Gateway health probe.
//!
//! # Responsibilities
//! - Issue a single GET to `{gateway}/health` under a fixed timeout
//! - Report reachability and latency in a serializable shape
//!
//! # Design Decisions
//! - Bypasses the retry policy; one probe, one answer
//! - Never fails; transport errors become an `unhealthy` report

use std::time::{Duration, Instant};

use axum::http::{HeaderMap, Method};
use serde::Serialize;

use crate::forwarder::target::build_target_url;
use crate::observability::metrics;
use crate::resilience::with_deadline;
use crate::upstream::{OutboundRequest, ResponseKind, UpstreamTransport};

const PROBE_PATH: &str = "/health";
const PROBE_BODY_LIMIT: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Outcome of one gateway probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub gateway_reachable: bool,
    pub response_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Probe the gateway once.
pub async fn probe_gateway(
    transport: &dyn UpstreamTransport,
    gateway_url: &str,
    timeout: Duration,
) -> HealthReport {
    let started = Instant::now();
    let request = OutboundRequest {
        method: Method::GET,
        url: build_target_url(gateway_url, PROBE_PATH, &[]),
        headers: HeaderMap::new(),
        body: None,
        response_kind: ResponseKind::Decoded,
        max_response_bytes: PROBE_BODY_LIMIT,
    };

    let result = with_deadline(timeout, transport.send(request)).await;
    let measured = format!("{}ms", started.elapsed().as_millis());

    let report = match result {
        Ok(response) => {
            let healthy = (200..300).contains(&response.status);
            if !healthy {
                tracing::warn!(status = response.status, "Gateway health probe returned non-success status");
            }
            let response_time = response
                .headers
                .get("x-response-time")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .unwrap_or(measured);
            HealthReport {
                status: if healthy {
                    HealthStatus::Healthy
                } else {
                    HealthStatus::Unhealthy
                },
                gateway_reachable: response.status == 200,
                response_time,
                error: None,
                code: None,
            }
        }
        Err(err) => {
            tracing::warn!(error = %err.message, code = err.kind.code(), "Gateway health probe failed");
            HealthReport {
                status: HealthStatus::Unhealthy,
                gateway_reachable: false,
                response_time: measured,
                error: Some(err.message),
                code: Some(err.kind.code()),
            }
        }
    };

    metrics::record_gateway_health(report.is_healthy());
    report
}
