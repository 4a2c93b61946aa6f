//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with health, stats and forwarding handlers
//! - Wire up middleware (tracing, CORS, body limit, tenant resolution)
//! - Serve on a bound listener until the shutdown signal fires

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::forwarder::Forwarder;
use crate::http::request::extract_forward_request;
use crate::tenancy::{tenant_middleware, TenantRegistry};

const SERVICE_NAME: &str = "frontend-client-server";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Forwarder,
    pub max_body_bytes: usize,
}

/// HTTP host server in front of the forwarder.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: AppConfig, forwarder: Forwarder) -> Self {
        let tenants = Arc::new(TenantRegistry::from_config(&config.tenants));
        tracing::info!(tenants = tenants.len(), "Tenant registry loaded");

        let state = AppState {
            forwarder,
            max_body_bytes: config.gateway.max_body_bytes,
        };
        let router = Self::build_router(state, tenants);
        Self { router, config }
    }

    fn build_router(state: AppState, tenants: Arc<TenantRegistry>) -> Router {
        let max_body_bytes = state.max_body_bytes;

        let api = Router::new()
            .route("/api/{*path}", any(forward_handler))
            .route_layer(middleware::from_fn_with_state(tenants, tenant_middleware));

        Router::new()
            .route("/health", get(health_handler))
            .route("/health/gateway", get(gateway_health_handler))
            .route("/health/stats", get(stats_handler))
            .merge(api)
            .fallback(not_found_handler)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(max_body_bytes))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            gateway = %self.config.gateway.url,
            environment = %self.config.runtime.environment,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn health_handler() -> impl IntoResponse {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    Json(json!({
        "status": "healthy",
        "timestamp": timestamp,
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn gateway_health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.forwarder.health_check().await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

async fn stats_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.forwarder.stats())
}

/// Relay everything under `/api` to the gateway.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    match extract_forward_request(request, state.max_body_bytes).await {
        Ok(forward) => state.forwarder.forward(forward).await.into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

async fn not_found_handler(method: Method, uri: Uri) -> impl IntoResponse {
    tracing::warn!(method = %method, path = %uri.path(), "Route not found");
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Route not found",
            "method": method.as_str(),
            "path": uri.path(),
        })),
    )
}
