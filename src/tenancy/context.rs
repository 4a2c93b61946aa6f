//! Per-request tenant context.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::TenantConfig;

/// Identifies which customer's data and settings apply to a request.
///
/// Built once per inbound request by tenant resolution and never mutated
/// while a forward call is in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantContext {
    pub id: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Extra substitution keys; built-in keys always take precedence.
    #[serde(default)]
    pub placeholders: BTreeMap<String, String>,
    /// Opaque settings for the gateway's own tenant lookup.
    #[serde(default)]
    pub config: Option<serde_json::Value>,
}

fn default_api_version() -> String {
    "v1".to_string()
}

impl TenantContext {
    /// Minimal context carrying only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            domain: None,
            database: None,
            schema: None,
            api_version: default_api_version(),
            placeholders: BTreeMap::new(),
            config: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_placeholder(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.placeholders.insert(key.into(), value.into());
        self
    }

    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = Some(config);
        self
    }

    /// Value for the `X-Tenant-Config` header: the config as JSON, or `{}`.
    pub fn config_header(&self) -> String {
        match &self.config {
            Some(value) => value.to_string(),
            None => "{}".to_string(),
        }
    }
}

impl From<&TenantConfig> for TenantContext {
    fn from(config: &TenantConfig) -> Self {
        Self {
            id: config.id.clone(),
            domain: config.domain.clone(),
            database: config.database.clone(),
            schema: config.schema.clone(),
            api_version: if config.api_version.is_empty() {
                default_api_version()
            } else {
                config.api_version.clone()
            },
            placeholders: config.placeholders.clone(),
            config: config.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_header() {
        let tenant = TenantContext::new("t1");
        assert_eq!(tenant.config_header(), "{}");

        let tenant = tenant.with_config(json!({"plan": "gold"}));
        assert_eq!(tenant.config_header(), r#"{"plan":"gold"}"#);
    }

    #[test]
    fn test_api_version_defaults_on_deserialize() {
        let tenant: TenantContext = serde_json::from_str(r#"{"id": "t1"}"#).unwrap();
        assert_eq!(tenant.api_version, "v1");
        assert!(tenant.placeholders.is_empty());
    }
}
