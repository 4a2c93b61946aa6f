//! Pooled HTTP client implementation of the upstream transport.

use std::time::Duration;

use async_trait::async_trait;
use axum::http::header::{ACCEPT_ENCODING, CONTENT_LENGTH};
use bytes::BytesMut;

use crate::upstream::{
    reason_phrase, OutboundRequest, ResponseData, TransportError, UpstreamResponse,
    UpstreamTransport,
};

/// Shared, connection-pooled client. Cloning is cheap and safe across tasks.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build the transport. Per-attempt deadlines are enforced by the caller.
    pub fn new(connect_timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl UpstreamTransport for HttpTransport {
    async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, TransportError> {
        let OutboundRequest {
            method,
            url,
            mut headers,
            body,
            response_kind,
            max_response_bytes,
        } = request;

        // Length is recomputed from the encoded body; encoding is negotiated by the client.
        headers.remove(CONTENT_LENGTH);
        headers.remove(ACCEPT_ENCODING);

        let mut builder = self.client.request(method, &url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let mut response = builder.send().await?;
        let status = response.status().as_u16();

        if let Some(len) = response.content_length() {
            if len > max_response_bytes as u64 {
                return Err(TransportError::body_too_large(max_response_bytes));
            }
        }

        let headers = std::mem::take(response.headers_mut());
        let mut buffer = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            if buffer.len() + chunk.len() > max_response_bytes {
                return Err(TransportError::body_too_large(max_response_bytes));
            }
            buffer.extend_from_slice(&chunk);
        }

        Ok(UpstreamResponse {
            status,
            status_text: reason_phrase(status),
            headers,
            body: ResponseData::decode(response_kind, buffer.freeze()),
        })
    }
}
