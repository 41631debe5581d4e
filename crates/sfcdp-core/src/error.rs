// ── Core error types ──
//
// One variant per pipeline stage. The `From<sfcdp_api::Error>` impl keeps
// the upstream failure (status + body) intact so the CLI can print the
// server's own diagnostic instead of a generic message.

use sfcdp_api::{Failure, TokenHop, UpstreamBody};
use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Signing ──────────────────────────────────────────────────────
    #[error("Cannot read private key {path}: {reason}")]
    KeyFile { path: String, reason: String },

    #[error("Cannot sign JWT assertion: {message}")]
    Signing { message: String },

    // ── Token exchange ───────────────────────────────────────────────
    #[error("{hop} token exchange failed: {failure}")]
    TokenExchange { hop: TokenHop, failure: Failure },

    // ── Data Cloud API ───────────────────────────────────────────────
    #[error("Metadata fetch failed: {failure}")]
    MetadataFetch { failure: Failure },

    #[error("Query failed at offset {offset}: {failure}")]
    QueryFetch { offset: u64, failure: Failure },

    #[error("Malformed response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },

    // ── Transport ────────────────────────────────────────────────────
    #[error("Connection failed: {message}")]
    Connection { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    fn failure(&self) -> Option<&Failure> {
        match self {
            Self::TokenExchange { failure, .. }
            | Self::MetadataFetch { failure }
            | Self::QueryFetch { failure, .. } => Some(failure),
            _ => None,
        }
    }

    /// The server's error payload, if one was returned.
    pub fn upstream_body(&self) -> Option<&UpstreamBody> {
        self.failure().and_then(Failure::body)
    }

    pub fn status(&self) -> Option<u16> {
        self.failure().and_then(Failure::status)
    }

    /// Returns `true` if a call timed out before any response.
    pub fn is_timeout(&self) -> bool {
        matches!(self.failure(), Some(Failure::Network { timeout: true, .. }))
    }

    /// Returns `true` if no response was received at all.
    pub fn is_network(&self) -> bool {
        matches!(self.failure(), Some(Failure::Network { .. }))
            || matches!(self, Self::Connection { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<sfcdp_api::Error> for CoreError {
    fn from(err: sfcdp_api::Error) -> Self {
        match err {
            sfcdp_api::Error::KeyFile { path, source } => CoreError::KeyFile {
                path: path.display().to_string(),
                reason: source.to_string(),
            },
            sfcdp_api::Error::Signing(e) => CoreError::Signing {
                message: e.to_string(),
            },
            sfcdp_api::Error::TokenExchange { hop, failure } => {
                CoreError::TokenExchange { hop, failure }
            }
            sfcdp_api::Error::MetadataFetch { failure } => CoreError::MetadataFetch { failure },
            sfcdp_api::Error::QueryFetch { offset, failure } => {
                CoreError::QueryFetch { offset, failure }
            }
            sfcdp_api::Error::MalformedResponse {
                endpoint,
                message,
                body: _,
            } => CoreError::MalformedResponse { endpoint, message },
            sfcdp_api::Error::InvalidHeader(message) => CoreError::MalformedResponse {
                endpoint: "token exchange".into(),
                message,
            },
            sfcdp_api::Error::Transport(e) => CoreError::Connection {
                message: e.to_string(),
            },
            sfcdp_api::Error::Tls(message) => CoreError::Connection {
                message: format!("TLS error: {message}"),
            },
            sfcdp_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
        }
    }
}
