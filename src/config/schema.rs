//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the frontend proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream API Gateway and forwarding policy.
    pub gateway: GatewayConfig,

    /// Process-wide runtime settings.
    pub runtime: RuntimeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Tenants this server is allowed to forward for.
    pub tenants: Vec<TenantConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3001").
    pub bind_address: String,

    /// Seconds to wait for in-flight requests before forcing exit.
    pub shutdown_grace_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
            shutdown_grace_secs: 10,
        }
    }
}

/// Upstream gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL every forwarded path is appended to.
    pub url: String,

    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,

    /// Maximum number of attempts per forwarded call.
    pub retry_attempts: u32,

    /// Linear backoff step in milliseconds.
    pub retry_delay_ms: u64,

    /// Cap for request and response bodies in bytes.
    pub max_body_bytes: usize,

    /// Fixed timeout for the gateway health probe in milliseconds.
    pub health_timeout_ms: u64,

    /// TCP connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8000".to_string(),
            timeout_ms: 30_000,
            retry_attempts: 3,
            retry_delay_ms: 1_000,
            max_body_bytes: 50 * 1024 * 1024, // 50MB
            health_timeout_ms: 5_000,
            connect_timeout_ms: 5_000,
        }
    }
}

/// Process-wide runtime settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Deployment environment name, exposed as the `{{environment}}` placeholder.
    pub environment: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// A tenant known to this server.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TenantConfig {
    /// Tenant identifier, sent upstream as `X-Tenant-ID`.
    pub id: String,

    /// Public domain the tenant is served on.
    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default)]
    pub database: Option<String>,

    #[serde(default)]
    pub schema: Option<String>,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Extra `{{key}}` substitutions for request bodies and queries.
    #[serde(default)]
    pub placeholders: BTreeMap<String, String>,

    /// Opaque settings serialized into `X-Tenant-Config`.
    #[serde(default)]
    pub config: Option<serde_json::Value>,
}

fn default_api_version() -> String {
    "v1".to_string()
}
