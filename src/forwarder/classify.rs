//! Packaging of gateway answers into forward results.

use crate::forwarder::types::{ForwardOutcome, ForwardResult};
use crate::security::headers::filter_response_headers;
use crate::upstream::UpstreamResponse;

/// Wrap a gateway answer, whatever its status, as a non-error result.
pub fn from_upstream(response: UpstreamResponse, request_id: String, duration_ms: u64) -> ForwardResult {
    ForwardResult {
        status: response.status,
        status_text: response.status_text,
        headers: filter_response_headers(&response.headers),
        data: response.body,
        request_id,
        duration_ms,
        outcome: ForwardOutcome::Upstream,
    }
}
