//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Build the forwarder from the validated configuration
//! - Start the metrics exporter when enabled
//! - Bind the listener last, so traffic only arrives when ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal

use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{load_config, AppConfig, ConfigError, LoadedConfig};
use crate::forwarder::{Forwarder, ForwarderConfig};
use crate::observability::metrics;
use crate::upstream::TransportError;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build upstream client: {0}")]
    Transport(#[from] TransportError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Load configuration from `path` (if any) and the environment.
pub fn load(path: Option<&Path>) -> Result<LoadedConfig, StartupError> {
    Ok(load_config(path)?)
}

/// Log the settings the loader had to ignore. Call after logging is installed.
pub fn report_ignored(loaded: &LoadedConfig) {
    for setting in &loaded.ignored {
        tracing::warn!(
            key = %setting.key,
            value = %setting.value,
            "Ignoring unparseable numeric setting"
        );
    }
}

/// Build the forwarder over the pooled HTTP client.
pub fn build_forwarder(config: &AppConfig) -> Result<Forwarder, StartupError> {
    let forwarder_config =
        ForwarderConfig::from_gateway(&config.gateway, config.runtime.environment.clone());
    let forwarder = Forwarder::with_http_transport(
        forwarder_config,
        Duration::from_millis(config.gateway.connect_timeout_ms),
    )?;

    tracing::info!(
        gateway = %config.gateway.url,
        timeout_ms = config.gateway.timeout_ms,
        retry_attempts = config.gateway.retry_attempts,
        retry_delay_ms = config.gateway.retry_delay_ms,
        max_body_bytes = config.gateway.max_body_bytes,
        "Forwarder configured"
    );
    Ok(forwarder)
}

/// Install the Prometheus exporter if enabled and the address parses.
pub fn start_metrics(config: &AppConfig) {
    if !config.observability.metrics_enabled {
        return;
    }
    match config.observability.metrics_address.parse() {
        Ok(addr) => metrics::init_metrics(addr),
        Err(_) => tracing::error!(
            metrics_address = %config.observability.metrics_address,
            "Failed to parse metrics address"
        ),
    }
}

pub async fn bind(config: &AppConfig) -> Result<TcpListener, StartupError> {
    let address = config.listener.bind_address.clone();
    TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })
}
