//! Synthesized results for calls that never got a gateway answer.

use axum::http::HeaderMap;
use serde_json::json;

use crate::forwarder::types::{ForwardOutcome, ForwardResult};
use crate::upstream::{FailureKind, ResponseData, TransportError};

const STATUS_TEXT: &str = "Gateway Error";

/// Fixed status and client-facing message for each failure kind.
pub fn failure_status(kind: FailureKind) -> (u16, &'static str) {
    match kind {
        FailureKind::Timeout => (408, "Request timeout"),
        FailureKind::HostNotFound => (502, "API Gateway not found"),
        FailureKind::ConnectionRefused => (503, "API Gateway connection refused"),
        _ => (502, "API Gateway request failed"),
    }
}

/// Build the error result for a pure transport failure.
///
/// The body carries the generic message plus the raw cause and code for
/// diagnostics; no gateway headers are exposed.
pub fn from_transport_error(err: TransportError, request_id: String, duration_ms: u64) -> ForwardResult {
    let (status, message) = failure_status(err.kind);
    ForwardResult {
        status,
        status_text: STATUS_TEXT.to_string(),
        data: ResponseData::Json(json!({
            "error": message,
            "message": err.message,
            "code": err.kind.code(),
        })),
        headers: HeaderMap::new(),
        request_id,
        duration_ms,
        outcome: ForwardOutcome::TransportError {
            kind: err.kind,
            message: err.message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_table() {
        assert_eq!(failure_status(FailureKind::Timeout), (408, "Request timeout"));
        assert_eq!(failure_status(FailureKind::HostNotFound), (502, "API Gateway not found"));
        assert_eq!(
            failure_status(FailureKind::ConnectionRefused),
            (503, "API Gateway connection refused")
        );
        assert_eq!(failure_status(FailureKind::ConnectionReset), (502, "API Gateway request failed"));
        assert_eq!(failure_status(FailureKind::BodyTooLarge), (502, "API Gateway request failed"));
        assert_eq!(failure_status(FailureKind::Other), (502, "API Gateway request failed"));
    }

    #[test]
    fn test_synthesized_result_shape() {
        let err = TransportError::new(FailureKind::ConnectionRefused, "tcp connect error");
        let result = from_transport_error(err, "req_9".into(), 3);

        assert!(result.is_error());
        assert_eq!(result.status, 503);
        assert_eq!(result.status_text, "Gateway Error");
        assert!(result.headers.is_empty());
        assert_eq!(result.request_id, "req_9");
        let data = result.data.as_json().unwrap();
        assert_eq!(data["error"], "API Gateway connection refused");
        assert_eq!(data["message"], "tcp connect error");
        assert_eq!(data["code"], "ECONNREFUSED");
    }
}
