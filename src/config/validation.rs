//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, at least one attempt)
//! - Check the gateway URL is absolute http(s)
//! - Detect duplicate tenant ids
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("gateway.url '{url}' is invalid: {reason}")]
    GatewayUrl { url: String, reason: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("tenant at index {0} has an empty id")]
    EmptyTenantId(usize),

    #[error("tenant id '{0}' is declared more than once")]
    DuplicateTenant(String),
}

/// Validate a fully deserialized configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.gateway.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::GatewayUrl {
            url: config.gateway.url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::GatewayUrl {
            url: config.gateway.url.clone(),
            reason: e.to_string(),
        }),
    }

    let gateway = &config.gateway;
    if gateway.timeout_ms == 0 {
        errors.push(ValidationError::Zero { field: "gateway.timeout_ms" });
    }
    if gateway.retry_attempts == 0 {
        errors.push(ValidationError::Zero { field: "gateway.retry_attempts" });
    }
    if gateway.max_body_bytes == 0 {
        errors.push(ValidationError::Zero { field: "gateway.max_body_bytes" });
    }
    if gateway.health_timeout_ms == 0 {
        errors.push(ValidationError::Zero { field: "gateway.health_timeout_ms" });
    }

    if config
        .listener
        .bind_address
        .parse::<std::net::SocketAddr>()
        .is_err()
    {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let mut seen = HashSet::new();
    for (i, tenant) in config.tenants.iter().enumerate() {
        if tenant.id.trim().is_empty() {
            errors.push(ValidationError::EmptyTenantId(i));
        } else if !seen.insert(tenant.id.as_str()) {
            errors.push(ValidationError::DuplicateTenant(tenant.id.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
