use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the `sfcdp-api` crate.
///
/// Every stage of the pipeline has its own variant so callers can tell a
/// rejected assertion apart from a failed query page. Upstream response
/// bodies are preserved for diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Signing ─────────────────────────────────────────────────────
    /// The private key file could not be read.
    #[error("Cannot read private key {}: {source}", .path.display())]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The key is malformed or the assertion could not be signed.
    #[error("Failed to sign JWT assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    // ── Token exchange ──────────────────────────────────────────────
    /// Either OAuth hop returned a non-200 status or never got a response.
    #[error("{hop} token exchange failed: {failure}")]
    TokenExchange { hop: TokenHop, failure: Failure },

    // ── Data Cloud API ──────────────────────────────────────────────
    /// The metadata endpoint rejected the request.
    #[error("Metadata fetch failed: {failure}")]
    MetadataFetch { failure: Failure },

    /// A query page could not be fetched. Pages before `offset` were
    /// already delivered to the caller.
    #[error("Query fetch failed at offset {offset}: {failure}")]
    QueryFetch { offset: u64, failure: Failure },

    // ── Data ────────────────────────────────────────────────────────
    /// A 200 response whose body does not match the expected schema.
    #[error("Malformed response from {endpoint}: {message}")]
    MalformedResponse {
        endpoint: String,
        message: String,
        body: String,
    },

    /// A token value that cannot be carried in an HTTP header.
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error outside of a pipeline stage.
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or client build error.
    #[error("TLS error: {0}")]
    Tls(String),
}

impl Error {
    /// The structured upstream error body, if the server sent one.
    pub fn upstream_body(&self) -> Option<&UpstreamBody> {
        match self {
            Self::TokenExchange { failure, .. }
            | Self::MetadataFetch { failure }
            | Self::QueryFetch { failure, .. } => failure.body(),
            _ => None,
        }
    }

    /// HTTP status of the failed call, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::TokenExchange { failure, .. }
            | Self::MetadataFetch { failure }
            | Self::QueryFetch { failure, .. } => failure.status(),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` if the request timed out before a response arrived.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::TokenExchange { failure, .. }
            | Self::MetadataFetch { failure }
            | Self::QueryFetch { failure, .. } => {
                matches!(failure, Failure::Network { timeout: true, .. })
            }
            Self::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns `true` if no connection could be established.
    pub fn is_connect(&self) -> bool {
        match self {
            Self::TokenExchange { failure, .. }
            | Self::MetadataFetch { failure }
            | Self::QueryFetch { failure, .. } => {
                matches!(failure, Failure::Network { connect: true, .. })
            }
            Self::Transport(e) => e.is_connect(),
            _ => false,
        }
    }
}

// ── TokenHop ────────────────────────────────────────────────────────

/// Which of the two OAuth exchanges failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenHop {
    /// JWT assertion → core access token.
    Core,
    /// Core access token → Data Cloud access token.
    DataCloud,
}

impl fmt::Display for TokenHop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core => f.write_str("Core"),
            Self::DataCloud => f.write_str("Data Cloud"),
        }
    }
}

// ── Failure ─────────────────────────────────────────────────────────

/// Why a single HTTP call failed.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// The server answered with an unexpected status.
    Status {
        status: u16,
        body: Option<UpstreamBody>,
    },
    /// No response (DNS, refused connection, timeout, TLS).
    Network {
        message: String,
        timeout: bool,
        connect: bool,
    },
}

impl Failure {
    pub(crate) fn network(err: &reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
            timeout: err.is_timeout(),
            connect: err.is_connect(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network { .. } => None,
        }
    }

    pub fn body(&self) -> Option<&UpstreamBody> {
        match self {
            Self::Status { body, .. } => body.as_ref(),
            Self::Network { .. } => None,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, body } => {
                write!(f, "HTTP {status}")?;
                if let Some(summary) = body.as_ref().and_then(UpstreamBody::summary) {
                    write!(f, " ({summary})")?;
                }
                Ok(())
            }
            Self::Network { message, .. } => write!(f, "network error: {message}"),
        }
    }
}

// ── UpstreamBody ────────────────────────────────────────────────────

/// Raw error payload returned by Salesforce, kept for display.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    Json(serde_json::Value),
    Text(String),
}

impl UpstreamBody {
    /// Classify a raw body. Blank bodies yield `None`.
    pub fn from_raw(raw: String) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        match serde_json::from_str(&raw) {
            Ok(value) => Some(Self::Json(value)),
            Err(_) => Some(Self::Text(raw)),
        }
    }

    /// One-line summary from the usual OAuth / REST error shapes.
    ///
    /// OAuth endpoints answer `{"error": "...", "error_description": "..."}`,
    /// the REST API answers `[{"errorCode": "...", "message": "..."}]` or
    /// `{"message": "..."}`.
    pub fn summary(&self) -> Option<String> {
        match self {
            Self::Json(value) => {
                let obj = match value {
                    serde_json::Value::Array(items) => items.first()?,
                    other => other,
                };
                let text = |key: &str| obj.get(key).and_then(serde_json::Value::as_str);
                match (text("error"), text("error_description")) {
                    (Some(code), Some(desc)) => Some(format!("{code}: {desc}")),
                    (Some(code), None) => Some(code.to_owned()),
                    _ => match (text("errorCode"), text("message")) {
                        (Some(code), Some(msg)) => Some(format!("{code}: {msg}")),
                        (None, Some(msg)) => Some(msg.to_owned()),
                        (code, None) => code.map(str::to_owned),
                    },
                }
            }
            Self::Text(text) => {
                let line = text.lines().next()?.trim();
                Some(line.chars().take(200).collect())
            }
        }
    }

    /// Pretty-printed payload for stderr.
    pub fn pretty(&self) -> String {
        match self {
            Self::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Self::Text(text) => text.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_body_is_none() {
        assert_eq!(UpstreamBody::from_raw("  \n".into()), None);
    }

    #[test]
    fn oauth_error_summary() {
        let body = UpstreamBody::from_raw(
            r#"{"error":"invalid_grant","error_description":"user hasn't approved this consumer"}"#
                .into(),
        )
        .unwrap();
        assert_eq!(
            body.summary().as_deref(),
            Some("invalid_grant: user hasn't approved this consumer")
        );
    }

    #[test]
    fn rest_error_array_summary() {
        let body = UpstreamBody::Json(json!([
            { "errorCode": "INVALID_SQL", "message": "unknown table" }
        ]));
        assert_eq!(body.summary().as_deref(), Some("INVALID_SQL: unknown table"));
    }

    #[test]
    fn text_body_is_kept_verbatim() {
        let body = UpstreamBody::from_raw("Service Unavailable".into()).unwrap();
        assert_eq!(body, UpstreamBody::Text("Service Unavailable".into()));
        assert_eq!(body.pretty(), "Service Unavailable");
    }

    #[test]
    fn status_failure_display_includes_summary() {
        let failure = Failure::Status {
            status: 400,
            body: Some(UpstreamBody::Json(json!({ "error": "invalid_client_id" }))),
        };
        assert_eq!(failure.to_string(), "HTTP 400 (invalid_client_id)");
    }
}
