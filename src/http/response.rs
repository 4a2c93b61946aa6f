//! Rendering forward results back to the client.
//!
//! # Responsibilities
//! - Status and body from the `ForwardResult`
//! - Only allow-listed gateway headers, plus `X-Request-ID` and `X-Response-Time`
//!
//! # Design Decisions
//! - JSON is re-encoded, so `content-length` is always recomputed
//! - Text and binary bodies are written back untouched

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::forwarder::ForwardResult;
use crate::security::headers::X_REQUEST_ID;
use crate::upstream::ResponseData;

pub const X_RESPONSE_TIME: &str = "x-response-time";

impl IntoResponse for ForwardResult {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);

        let mut headers = self.headers;
        headers.remove(header::CONTENT_LENGTH);
        headers.remove(header::TRANSFER_ENCODING);

        let body = match self.data {
            ResponseData::Json(value) => {
                if !headers.contains_key(header::CONTENT_TYPE) {
                    headers.insert(
                        header::CONTENT_TYPE,
                        HeaderValue::from_static("application/json"),
                    );
                }
                match serde_json::to_vec(&value) {
                    Ok(encoded) => Body::from(encoded),
                    Err(e) => {
                        tracing::error!(request_id = %self.request_id, error = %e, "Failed to encode response body");
                        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                    }
                }
            }
            ResponseData::Text(text) => Body::from(text),
            ResponseData::Binary(bytes) => Body::from(bytes),
        };

        if let Ok(value) = HeaderValue::from_str(&self.request_id) {
            headers.insert(X_REQUEST_ID, value);
        }
        if let Ok(value) = HeaderValue::from_str(&format!("{}ms", self.duration_ms)) {
            headers.insert(X_RESPONSE_TIME, value);
        }

        let mut response = Response::new(body);
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response
    }
}
