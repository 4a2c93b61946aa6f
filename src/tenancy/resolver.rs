//! Tenant resolution middleware.
//!
//! Resolves the tenant for each inbound request and attaches it as a
//! request extension for the forwarding handler.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::config::TenantConfig;
use crate::tenancy::context::TenantContext;

/// Header a caller may use to select its tenant explicitly.
pub const X_TENANT_ID: &str = "x-tenant-id";

/// Lookup table of configured tenants.
#[derive(Debug, Default)]
pub struct TenantRegistry {
    by_id: HashMap<String, Arc<TenantContext>>,
    by_domain: HashMap<String, Arc<TenantContext>>,
}

impl TenantRegistry {
    pub fn from_config(tenants: &[TenantConfig]) -> Self {
        let mut registry = Self::default();
        for tenant in tenants {
            registry.insert(TenantContext::from(tenant));
        }
        registry
    }

    pub fn insert(&mut self, tenant: TenantContext) {
        let tenant = Arc::new(tenant);
        if let Some(domain) = &tenant.domain {
            self.by_domain.insert(domain.to_ascii_lowercase(), tenant.clone());
        }
        self.by_id.insert(tenant.id.clone(), tenant);
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Resolve by `x-tenant-id`, falling back to the `host` header's domain.
    pub fn resolve(&self, headers: &HeaderMap) -> Option<Arc<TenantContext>> {
        if let Some(id) = headers
            .get(X_TENANT_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            return self.by_id.get(id).cloned();
        }

        let host = headers.get(header::HOST).and_then(|v| v.to_str().ok())?;
        let domain = strip_port(host).to_ascii_lowercase();
        self.by_domain.get(&domain).cloned()
    }
}

fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Middleware attaching the resolved `Arc<TenantContext>` to the request.
pub async fn tenant_middleware(
    State(registry): State<Arc<TenantRegistry>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    match registry.resolve(request.headers()) {
        Some(tenant) => {
            request.extensions_mut().insert(tenant);
            next.run(request).await
        }
        None => {
            tracing::warn!(
                path = %request.uri().path(),
                "Tenant could not be resolved"
            );
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Tenant could not be resolved" })),
            )
                .into_response()
        }
    }
}
