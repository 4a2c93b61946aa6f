//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// An environment setting that was present but could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredSetting {
    pub key: String,
    pub value: String,
}

/// A validated configuration plus the settings dropped while building it.
///
/// `ignored` is reported by the caller once logging is installed.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub ignored: Vec<IgnoredSetting>,
}

/// Load configuration from an optional TOML file, apply environment
/// overrides, and validate the result.
///
/// This is the only place the process environment is consulted.
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    let ignored = apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(LoadedConfig { config, ignored })
}

/// Overlay environment-style settings onto `config`.
///
/// Numeric values that fail to parse, or parse to zero, keep the current value.
/// Unparseable ones are returned so they can be reported.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Vec<IgnoredSetting>
where
    F: Fn(&str) -> Option<String>,
{
    let mut ignored = Vec::new();

    if let Some(url) = lookup("API_GATEWAY_URL").filter(|v| !v.trim().is_empty()) {
        config.gateway.url = url.trim().to_string();
    }
    if let Some(ms) = positive(&lookup, &mut ignored, "REQUEST_TIMEOUT") {
        config.gateway.timeout_ms = ms;
    }
    if let Some(attempts) = positive(&lookup, &mut ignored, "RETRY_ATTEMPTS") {
        config.gateway.retry_attempts = u32::try_from(attempts).unwrap_or(u32::MAX);
    }
    if let Some(ms) = positive(&lookup, &mut ignored, "RETRY_DELAY") {
        config.gateway.retry_delay_ms = ms;
    }
    if let Some(bytes) = positive(&lookup, &mut ignored, "MAX_FILE_SIZE") {
        config.gateway.max_body_bytes = usize::try_from(bytes).unwrap_or(usize::MAX);
    }
    if let Some(env) = lookup("NODE_ENV").filter(|v| !v.trim().is_empty()) {
        config.runtime.environment = env.trim().to_string();
    }
    if let Some(port) =
        positive(&lookup, &mut ignored, "PORT").and_then(|p| u16::try_from(p).ok())
    {
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{}:{}", host, port);
    }
    if let Some(level) = lookup("LOG_LEVEL").filter(|v| !v.trim().is_empty()) {
        config.observability.log_level = level.trim().to_string();
    }
    ignored
}

fn positive<F>(lookup: &F, ignored: &mut Vec<IgnoredSetting>, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(0) => None,
        Ok(v) => Some(v),
        Err(_) => {
            ignored.push(IgnoredSetting {
                key: key.to_string(),
                value: raw,
            });
            None
        }
    }
}
