//! Wire encoding of structured bodies.
//!
//! The outgoing `Content-Type` decides the encoding: objects labelled
//! `application/x-www-form-urlencoded` are sent as form fields, everything
//! else as JSON. A body sent as JSON always carries a JSON content type.

use axum::http::{header, HeaderMap, HeaderValue};
use bytes::Bytes;
use serde_json::Value;
use url::form_urlencoded;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
const JSON: &str = "application/json";

/// Encode `value` for the gateway, aligning `headers` with what is sent.
pub fn encode_structured(value: &Value, headers: &mut HeaderMap) -> Result<Bytes, serde_json::Error> {
    let media_type = media_type(headers);

    if media_type.as_deref() == Some(FORM_URLENCODED) {
        if let Value::Object(fields) = value {
            let mut form = form_urlencoded::Serializer::new(String::new());
            for (key, field) in fields {
                form.append_pair(key, &form_value(field)?);
            }
            return Ok(Bytes::from(form.finish()));
        }
    }

    let is_json = media_type
        .as_deref()
        .is_some_and(|m| m == JSON || m.ends_with("+json"));
    if !is_json {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(JSON));
    }
    Ok(Bytes::from(serde_json::to_vec(value)?))
}

fn media_type(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
    Some(raw.split(';').next().unwrap_or("").trim().to_ascii_lowercase())
}

fn form_value(value: &Value) -> Result<String, serde_json::Error> {
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        nested => serde_json::to_string(nested)?,
    })
}
