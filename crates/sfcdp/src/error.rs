//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help
//! text. When Salesforce returned an error body, it is pretty-printed into
//! the diagnostic so the server's own explanation reaches stderr.

use miette::Diagnostic;
use thiserror::Error;

use sfcdp_api::Failure;
use sfcdp_config::ConfigError;
use sfcdp_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Usage ────────────────────────────────────────────────────────
    #[error("Missing {name}")]
    #[diagnostic(
        code(sfcdp::missing_argument),
        help(
            "Pass {flag}, set {env}, or store it in a profile.\n\
             Create a profile with: sfcdp config init"
        )
    )]
    MissingArgument {
        name: &'static str,
        flag: &'static str,
        env: &'static str,
    },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(sfcdp::validation))]
    Validation { field: String, reason: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(sfcdp::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: sfcdp config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Cannot read private key {path}")]
    #[diagnostic(
        code(sfcdp::key_file),
        help("{reason}\nPoint --privatekey (-k) at the PEM file registered with the connected app.")
    )]
    KeyFile { path: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Could not sign the JWT assertion: {message}")]
    #[diagnostic(
        code(sfcdp::signing),
        help("The private key must be an RSA key in PEM format (PKCS#1 or PKCS#8).")
    )]
    Signing { message: String },

    #[error("{hop} token exchange failed: {reason}")]
    #[diagnostic(code(sfcdp::token_exchange))]
    TokenExchange {
        hop: String,
        reason: String,
        #[help]
        upstream: Option<String>,
    },

    // ── Data Cloud API ───────────────────────────────────────────────
    #[error("Metadata fetch failed: {reason}")]
    #[diagnostic(code(sfcdp::metadata))]
    MetadataFetch {
        reason: String,
        #[help]
        upstream: Option<String>,
    },

    #[error("Query failed at offset {offset}: {reason}")]
    #[diagnostic(code(sfcdp::query))]
    QueryFetch {
        offset: u64,
        reason: String,
        #[help]
        upstream: Option<String>,
    },

    #[error("Unexpected response from {endpoint}: {message}")]
    #[diagnostic(code(sfcdp::malformed_response))]
    MalformedResponse { endpoint: String, message: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach Salesforce: {message}")]
    #[diagnostic(
        code(sfcdp::connection_failed),
        help("Check the login URL and your network. Behind a TLS-intercepting proxy, pass --ca-cert.")
    )]
    ConnectionFailed { message: String },

    #[error("Request timed out: {message}")]
    #[diagnostic(
        code(sfcdp::timeout),
        help("Increase the timeout with --timeout (seconds).")
    )]
    Timeout { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    #[diagnostic(code(sfcdp::config))]
    Config { message: String },

    // ── Output / IO ──────────────────────────────────────────────────
    #[error("Could not render output: {message}")]
    #[diagnostic(code(sfcdp::render))]
    Render { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{message}")]
    #[diagnostic(code(sfcdp::internal))]
    Internal { message: String },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MissingArgument { .. }
            | Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::KeyFile { .. } => exit_code::USAGE,
            Self::Signing { .. } | Self::TokenExchange { .. } => exit_code::AUTH,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            _ => exit_code::GENERAL,
        }
    }

    pub(crate) fn render(err: impl std::fmt::Display) -> Self {
        Self::Render {
            message: err.to_string(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

/// Failure text plus the pretty-printed upstream body, if any.
fn describe(failure: &Failure) -> (String, Option<String>) {
    let upstream = failure
        .body()
        .map(|body| format!("Salesforce responded with:\n{}", body.pretty()));
    (failure.to_string(), upstream)
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        if err.is_timeout() {
            return Self::Timeout {
                message: err.to_string(),
            };
        }
        if err.is_network() {
            return Self::ConnectionFailed {
                message: err.to_string(),
            };
        }

        match err {
            CoreError::KeyFile { path, reason } => Self::KeyFile { path, reason },
            CoreError::Signing { message } => Self::Signing { message },
            CoreError::TokenExchange { hop, failure } => {
                let (reason, upstream) = describe(&failure);
                Self::TokenExchange {
                    hop: hop.to_string(),
                    reason,
                    upstream,
                }
            }
            CoreError::MetadataFetch { failure } => {
                let (reason, upstream) = describe(&failure);
                Self::MetadataFetch { reason, upstream }
            }
            CoreError::QueryFetch { offset, failure } => {
                let (reason, upstream) = describe(&failure);
                Self::QueryFetch {
                    offset,
                    reason,
                    upstream,
                }
            }
            CoreError::MalformedResponse { endpoint, message } => {
                Self::MalformedResponse { endpoint, message }
            }
            CoreError::Connection { message } => Self::ConnectionFailed { message },
            CoreError::Config { message } => Self::Config { message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: "(see: sfcdp config profiles)".into(),
            },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}
