//! Error types for the reconciliation engine
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for reconciliation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the reconciliation engine
///
/// Non-2xx answers from the remote API are *not* errors: they flow into the
/// outcome classifier as data. Only the variants below abort an invocation.
#[derive(Error, Debug)]
pub enum Error {
    /// A field required by the requested state or operation is missing or invalid
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Configuration errors (unknown resource kind, unsupported operation, bad credentials)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection-level failures (refused, TLS, malformed response)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote API rejected the credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A server error the engine refuses to hide behind a degraded result
    #[error("Request has failed: status={status}, {body}")]
    RemoteFailure {
        /// HTTP status code returned by the server
        status: u16,
        /// Raw response text
        body: String,
    },

    /// I/O errors (argument files, REST log file)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a precondition error
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a fatal remote failure
    pub fn remote_failure(status: u16, body: impl Into<String>) -> Self {
        Self::RemoteFailure {
            status,
            body: body.into(),
        }
    }

    /// Whether the failure happened before any request was sent
    ///
    /// Used by the module binary to pick its exit code.
    pub fn is_setup_error(&self) -> bool {
        matches!(self, Self::Precondition(_) | Self::Config(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
