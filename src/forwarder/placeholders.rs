//! `{{key}}` substitution for request bodies and query parameters.

use serde_json::Value;

use crate::tenancy::TenantContext;

/// Resolved `(token, value)` pairs for one call.
///
/// Built-ins come first and cannot be shadowed by tenant-supplied keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderSet {
    entries: Vec<(String, String)>,
}

impl PlaceholderSet {
    /// Compute the substitution table for `tenant` in `environment`.
    pub fn for_tenant(tenant: &TenantContext, environment: &str) -> Self {
        let api_version = if tenant.api_version.is_empty() {
            "v1"
        } else {
            tenant.api_version.as_str()
        };

        let builtins = [
            ("tenant_id", Some(tenant.id.as_str())),
            ("tenant_domain", tenant.domain.as_deref()),
            ("tenant_database", tenant.database.as_deref()),
            ("tenant_schema", tenant.schema.as_deref()),
            ("api_version", Some(api_version)),
            ("environment", Some(environment)),
        ];

        let mut entries: Vec<(String, String)> = Vec::with_capacity(builtins.len() + tenant.placeholders.len());
        let mut reserved = Vec::with_capacity(builtins.len());
        for (key, value) in builtins {
            let token = token(key);
            if let Some(value) = value {
                entries.push((token.clone(), value.to_string()));
            }
            reserved.push(token);
        }

        for (key, value) in &tenant.placeholders {
            let token = token(key);
            if reserved.contains(&token) || entries.iter().any(|(t, _)| *t == token) {
                continue;
            }
            entries.push((token, value.clone()));
        }

        Self { entries }
    }

    /// Replace every occurrence of every token in `input`.
    pub fn apply_str(&self, input: &str) -> String {
        let mut output = input.to_string();
        for (token, value) in &self.entries {
            if output.contains(token.as_str()) {
                output = output.replace(token.as_str(), value);
            }
        }
        output
    }

    /// Walk a JSON tree, substituting inside every string.
    ///
    /// Arrays keep order and length, objects keep every key; non-string
    /// scalars pass through untouched.
    pub fn apply(&self, value: Value) -> Value {
        match value {
            Value::String(s) => Value::String(self.apply_str(&s)),
            Value::Array(items) => Value::Array(items.into_iter().map(|v| self.apply(v)).collect()),
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, v)| (key, self.apply(v)))
                    .collect(),
            ),
            other => other,
        }
    }
}

/// Wrap a bare key as `{{key}}`; already-wrapped keys are kept as is.
fn token(key: &str) -> String {
    let key = key.trim();
    if key.starts_with("{{") && key.ends_with("}}") && key.len() > 4 {
        key.to_string()
    } else {
        format!("{{{{{}}}}}", key)
    }
}

/// Substitute placeholders in a structured body. No tenant means no change.
pub fn substitute_value(value: Value, tenant: Option<&TenantContext>, environment: &str) -> Value {
    match tenant {
        Some(tenant) => PlaceholderSet::for_tenant(tenant, environment).apply(value),
        None => value,
    }
}

/// Substitute placeholders in query values. No tenant means no change.
pub fn substitute_query(
    query: Vec<(String, String)>,
    tenant: Option<&TenantContext>,
    environment: &str,
) -> Vec<(String, String)> {
    let Some(tenant) = tenant else {
        return query;
    };
    let set = PlaceholderSet::for_tenant(tenant, environment);
    query
        .into_iter()
        .map(|(key, value)| (key, set.apply_str(&value)))
        .collect()
}
