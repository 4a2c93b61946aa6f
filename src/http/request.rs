//! Inbound request extraction.
//!
//! # Responsibilities
//! - Map the axum request onto a `ForwardRequest`
//! - Decode JSON and urlencoded bodies into structured values
//! - Keep multipart bodies opaque, with their boundary-bearing content type
//! - Pick up the resolved tenant and the caller identity
//!
//! # Design Decisions
//! - Path and query are forwarded verbatim (no normalization)
//! - Body types other than JSON, urlencoded and multipart are not forwarded

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use url::form_urlencoded;

use crate::forwarder::{ForwardRequest, HttpMethod, MultipartBody, RequestBody};
use crate::security::headers::X_USER_ID;
use crate::tenancy::TenantContext;

/// Why an inbound request never reached the forwarder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestRejection {
    MethodNotAllowed(Method),
    PayloadTooLarge { limit: usize },
    InvalidJson,
}

impl IntoResponse for RequestRejection {
    fn into_response(self) -> Response {
        match self {
            RequestRejection::MethodNotAllowed(method) => (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(json!({ "error": "Method not allowed", "method": method.as_str() })),
            )
                .into_response(),
            RequestRejection::PayloadTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "error": "Payload too large", "limit": limit })),
            )
                .into_response(),
            RequestRejection::InvalidJson => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid JSON body" })),
            )
                .into_response(),
        }
    }
}

/// Build the forwarder's input from an inbound request.
pub async fn extract_forward_request(
    request: Request<Body>,
    max_body_bytes: usize,
) -> Result<ForwardRequest, RequestRejection> {
    let (parts, body) = request.into_parts();

    let method = HttpMethod::try_from(&parts.method).map_err(RequestRejection::MethodNotAllowed)?;
    let path = parts.uri.path().to_string();
    let query = parts
        .uri
        .query()
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let tenant = parts.extensions.get::<Arc<TenantContext>>().cloned();
    let user_id = parts
        .headers
        .get(X_USER_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let bytes = body::to_bytes(body, max_body_bytes).await.map_err(|e| {
        tracing::warn!(error = %e, limit = max_body_bytes, path = %path, "Rejecting request body");
        RequestRejection::PayloadTooLarge {
            limit: max_body_bytes,
        }
    })?;
    let body = decode_body(&parts.headers, bytes)?;

    let mut forward = ForwardRequest::new(method, path)
        .with_body(body)
        .with_headers(parts.headers)
        .with_query(query);
    forward.tenant = tenant;
    forward.user_id = user_id;
    Ok(forward)
}

fn decode_body(headers: &HeaderMap, bytes: bytes::Bytes) -> Result<RequestBody, RequestRejection> {
    if bytes.is_empty() {
        return Ok(RequestBody::Empty);
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();

    match media_type.as_str() {
        "multipart/form-data" => Ok(RequestBody::Multipart(MultipartBody {
            content_type: content_type.to_string(),
            payload: bytes,
        })),
        "application/x-www-form-urlencoded" => {
            let fields: Map<String, Value> = form_urlencoded::parse(&bytes)
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect();
            Ok(RequestBody::Structured(Value::Object(fields)))
        }
        "" | "application/json" => serde_json::from_slice(&bytes)
            .map(RequestBody::Structured)
            .map_err(|_| RequestRejection::InvalidJson),
        other if other.ends_with("+json") => serde_json::from_slice(&bytes)
            .map(RequestBody::Structured)
            .map_err(|_| RequestRejection::InvalidJson),
        other => {
            tracing::warn!(
                content_type = %other,
                bytes = bytes.len(),
                "Dropping body of unsupported media type"
            );
            Ok(RequestBody::Empty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, uri: &str, content_type: Option<&str>, body: &'static [u8]) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_json_body_and_query() {
        let mut req = request(
            Method::POST,
            "/api/leave/apply?from=2024-01-01&tag=a&tag=b",
            Some("application/json"),
            br#"{"days":2}"#,
        );
        req.headers_mut().insert("x-user-id", "U7".parse().unwrap());
        req.extensions_mut().insert(Arc::new(TenantContext::new("T1")));

        let forward = extract_forward_request(req, 1024).await.unwrap();

        assert_eq!(forward.method, HttpMethod::Post);
        assert_eq!(forward.path, "/api/leave/apply");
        assert_eq!(
            forward.query,
            vec![
                ("from".to_string(), "2024-01-01".to_string()),
                ("tag".to_string(), "a".to_string()),
                ("tag".to_string(), "b".to_string()),
            ]
        );
        assert_eq!(forward.body, RequestBody::Structured(json!({"days": 2})));
        assert_eq!(forward.tenant_id(), Some("T1"));
        assert_eq!(forward.user_id.as_deref(), Some("U7"));
    }

    #[tokio::test]
    async fn test_multipart_stays_opaque() {
        let req = request(
            Method::POST,
            "/api/documents/upload",
            Some("multipart/form-data; boundary=xyz"),
            b"--xyz\r\n\r\ndata\r\n--xyz--\r\n",
        );
        let forward = extract_forward_request(req, 1024).await.unwrap();
        match forward.body {
            RequestBody::Multipart(m) => {
                assert_eq!(m.content_type, "multipart/form-data; boundary=xyz");
                assert_eq!(&m.payload[..], b"--xyz\r\n\r\ndata\r\n--xyz--\r\n");
            }
            other => panic!("expected multipart, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_urlencoded_becomes_structured() {
        let req = request(
            Method::POST,
            "/api/feedback",
            Some("application/x-www-form-urlencoded"),
            b"name=Jane+Doe&rating=5",
        );
        let forward = extract_forward_request(req, 1024).await.unwrap();
        assert_eq!(
            forward.body,
            RequestBody::Structured(json!({"name": "Jane Doe", "rating": "5"}))
        );
    }

    #[tokio::test]
    async fn test_invalid_json_rejected() {
        let req = request(Method::POST, "/api/x", Some("application/json"), b"{nope");
        assert_eq!(
            extract_forward_request(req, 1024).await.unwrap_err(),
            RequestRejection::InvalidJson
        );
    }

    #[tokio::test]
    async fn test_oversize_body_rejected() {
        let req = request(Method::POST, "/api/x", Some("application/json"), b"[1,2,3,4,5,6,7,8,9]");
        assert_eq!(
            extract_forward_request(req, 4).await.unwrap_err(),
            RequestRejection::PayloadTooLarge { limit: 4 }
        );
    }

    #[tokio::test]
    async fn test_unsupported_method_rejected() {
        let req = request(Method::OPTIONS, "/api/x", None, b"");
        assert!(matches!(
            extract_forward_request(req, 1024).await,
            Err(RequestRejection::MethodNotAllowed(m)) if m == Method::OPTIONS
        ));
    }

    #[tokio::test]
    async fn test_unsupported_media_type_not_forwarded() {
        let req = request(Method::POST, "/api/notes", Some("text/plain"), b"hello");
        let forward = extract_forward_request(req, 1024).await.unwrap();
        assert_eq!(forward.body, RequestBody::Empty);
    }

    #[tokio::test]
    async fn test_empty_body_is_empty() {
        let req = request(Method::GET, "/api/x", Some("application/json"), b"");
        let forward = extract_forward_request(req, 1024).await.unwrap();
        assert_eq!(forward.body, RequestBody::Empty);
        assert!(forward.query.is_empty());
    }
}
