//! Header manipulation for the gateway boundary.
//!
//! # Responsibilities
//! - Strip hop-by-hop headers from inbound requests
//! - Inject tenant and identity headers for the gateway
//! - Reduce gateway responses to an allow-list of re-exposable headers
//!
//! # Design Decisions
//! - Injected identity headers always win over same-named inbound headers
//! - Multipart payloads keep their own boundary-bearing content type
//! - Dropped response headers are silent, not errors

use axum::http::{
    header::{self, HeaderName},
    HeaderMap, HeaderValue,
};

use crate::forwarder::RequestBody;
use crate::tenancy::TenantContext;

/// Headers meaningful for a single transport hop only.
pub const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
    "host",
];

/// Response headers safe to hand back to the original client.
pub const RESPONSE_ALLOW_LIST: [&str; 11] = [
    "content-type",
    "content-length",
    "content-disposition",
    "cache-control",
    "etag",
    "last-modified",
    "x-rate-limit-remaining",
    "x-rate-limit-reset",
    "access-control-allow-origin",
    "access-control-allow-methods",
    "access-control-allow-headers",
];

/// Prefix of application headers the gateway may always expose.
pub const CUSTOM_HEADER_PREFIX: &str = "x-custom-";

pub const X_TENANT_ID: HeaderName = HeaderName::from_static("x-tenant-id");
pub const X_USER_ID: HeaderName = HeaderName::from_static("x-user-id");
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
pub const X_CLIENT_SERVER: HeaderName = HeaderName::from_static("x-client-server");
pub const X_TENANT_DOMAIN: HeaderName = HeaderName::from_static("x-tenant-domain");
pub const X_TENANT_CONFIG: HeaderName = HeaderName::from_static("x-tenant-config");
pub const X_FORWARDED_BY: HeaderName = HeaderName::from_static("x-forwarded-by");
pub const X_ORIGINAL_HOST: HeaderName = HeaderName::from_static("x-original-host");

const CLIENT_SERVER: &str = "frontend-proxy";
const FORWARDED_BY: &str = "frontend-client-server";
const DEFAULT_MEDIA_TYPE: &str = "application/json";
const MULTIPART_FORM: &str = "multipart/form-data";

/// Who is calling, on whose behalf, under which correlation id.
#[derive(Debug, Clone, Copy)]
pub struct IdentityContext<'a> {
    pub tenant: Option<&'a TenantContext>,
    pub user_id: Option<&'a str>,
    pub request_id: &'a str,
}

/// Copy `headers` without any hop-by-hop entries.
pub fn filter_request_headers(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        // HeaderName is always lowercase
        if !HOP_BY_HOP.contains(&name.as_str()) {
            filtered.append(name.clone(), value.clone());
        }
    }
    filtered
}

/// Build the exact header set sent to the gateway.
pub fn prepare_headers(
    original: &HeaderMap,
    body: &RequestBody,
    identity: IdentityContext<'_>,
) -> HeaderMap {
    let mut headers = filter_request_headers(original);
    let tenant = identity.tenant;

    if let Some(tenant) = tenant {
        set(&mut headers, X_TENANT_ID, &tenant.id);
    }
    if let Some(user_id) = identity.user_id {
        set(&mut headers, X_USER_ID, user_id);
    }
    set(&mut headers, X_REQUEST_ID, identity.request_id);
    set(&mut headers, X_CLIENT_SERVER, CLIENT_SERVER);
    set(
        &mut headers,
        X_TENANT_DOMAIN,
        tenant.and_then(|t| t.domain.as_deref()).unwrap_or(""),
    );
    let config = tenant.map_or_else(|| "{}".to_string(), TenantContext::config_header);
    set(&mut headers, X_TENANT_CONFIG, &config);
    set(&mut headers, X_FORWARDED_BY, FORWARDED_BY);
    if let Some(host) = original.get(header::HOST) {
        headers.insert(X_ORIGINAL_HOST, host.clone());
    }

    match body {
        RequestBody::Multipart(multipart) => {
            set(&mut headers, header::CONTENT_TYPE, &multipart.content_type);
        }
        _ if declares_multipart(&headers) => {}
        _ => {
            let content_type = original
                .get(header::CONTENT_TYPE)
                .cloned()
                .unwrap_or(HeaderValue::from_static(DEFAULT_MEDIA_TYPE));
            let accept = original
                .get(header::ACCEPT)
                .cloned()
                .unwrap_or(HeaderValue::from_static(DEFAULT_MEDIA_TYPE));
            headers.insert(header::CONTENT_TYPE, content_type);
            headers.insert(header::ACCEPT, accept);
        }
    }

    headers
}

/// Keep only allow-listed and `x-custom-*` response headers.
pub fn filter_response_headers(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::new();
    for (name, value) in headers {
        let name_str = name.as_str();
        if RESPONSE_ALLOW_LIST.contains(&name_str) || name_str.starts_with(CUSTOM_HEADER_PREFIX) {
            filtered.append(name.clone(), value.clone());
        }
    }
    filtered
}

fn declares_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains(MULTIPART_FORM))
}

fn set(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_bytes(value.as_bytes()) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => {
            tracing::warn!(header = %name, "Dropping header with invalid value");
            headers.remove(&name);
        }
    }
}
