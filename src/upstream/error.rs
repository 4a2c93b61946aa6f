//! Transport failure taxonomy.

use thiserror::Error;

/// Classified reason an attempt produced no upstream response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Timeout,
    ConnectionReset,
    HostNotFound,
    ConnectionRefused,
    BodyTooLarge,
    Other,
}

impl FailureKind {
    /// Diagnostic code surfaced to callers in synthesized error bodies.
    pub fn code(self) -> &'static str {
        match self {
            FailureKind::Timeout => "ETIMEDOUT",
            FailureKind::ConnectionReset => "ECONNRESET",
            FailureKind::HostNotFound => "ENOTFOUND",
            FailureKind::ConnectionRefused => "ECONNREFUSED",
            FailureKind::BodyTooLarge => "E2BIG",
            FailureKind::Other => "EUNKNOWN",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// An attempt that failed below the HTTP layer.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(after_ms: u64) -> Self {
        Self::new(FailureKind::Timeout, format!("timeout of {}ms exceeded", after_ms))
    }

    pub fn body_too_large(limit: usize) -> Self {
        Self::new(
            FailureKind::BodyTooLarge,
            format!("body length exceeds the {} byte limit", limit),
        )
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let kind = classify(&err);
        Self::new(kind, describe(&err))
    }
}

/// Map a client error onto a failure kind by inspecting its source chain.
fn classify(err: &reqwest::Error) -> FailureKind {
    if err.is_timeout() {
        return FailureKind::Timeout;
    }

    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(current) = source {
        if let Some(io) = current.downcast_ref::<std::io::Error>() {
            match io.kind() {
                std::io::ErrorKind::ConnectionRefused => return FailureKind::ConnectionRefused,
                std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::BrokenPipe
                | std::io::ErrorKind::UnexpectedEof => return FailureKind::ConnectionReset,
                std::io::ErrorKind::TimedOut => return FailureKind::Timeout,
                _ => {}
            }
        }
        let text = current.to_string();
        if text.contains("dns error") || text.contains("failed to lookup address") {
            return FailureKind::HostNotFound;
        }
        source = current.source();
    }

    if err.is_body() || err.is_decode() {
        return FailureKind::ConnectionReset;
    }
    FailureKind::Other
}

/// Flatten the error chain into one line.
fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(current) = source {
        message.push_str(": ");
        message.push_str(&current.to_string());
        source = current.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(FailureKind::Timeout.code(), "ETIMEDOUT");
        assert_eq!(FailureKind::HostNotFound.code(), "ENOTFOUND");
        assert_eq!(FailureKind::ConnectionRefused.code(), "ECONNREFUSED");
        assert_eq!(FailureKind::ConnectionReset.code(), "ECONNRESET");
    }

    #[test]
    fn test_display() {
        let err = TransportError::timeout(250);
        assert_eq!(err.to_string(), "ETIMEDOUT: timeout of 250ms exceeded");
    }
}
