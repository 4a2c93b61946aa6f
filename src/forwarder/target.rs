//! Target URL construction.
//!
//! The gateway base URL and the path are concatenated verbatim. Paths are
//! trusted: duplicate slashes and traversal segments are not normalized.

use url::form_urlencoded;

/// Join base, path and (already substituted) query into one absolute URL.
pub fn build_target_url(base: &str, path: &str, query: &[(String, String)]) -> String {
    let mut url = format!("{}{}", base, path);
    if !query.is_empty() {
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query.iter())
            .finish();
        url.push('?');
        url.push_str(&encoded);
    }
    url
}

/// Downloads and octet-stream requests are received as raw bytes.
pub fn wants_binary(path: &str, accept: Option<&str>) -> bool {
    path.contains("/download/") || accept.is_some_and(|a| a.contains("application/octet-stream"))
}
