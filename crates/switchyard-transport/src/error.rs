//! Error types for the transport layer.

use thiserror::Error;

/// Errors from starting or running the webhook server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("server task aborted: {0}")]
    Join(String),
}

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Reasons an inbound request fails authentication.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("verification token mismatch")]
    TokenMismatch,

    #[error("missing header `{0}`")]
    MissingHeader(&'static str),

    #[error("malformed request timestamp")]
    InvalidTimestamp,

    #[error("request timestamp is {age}s away from now")]
    StaleTimestamp { age: u64 },

    #[error("malformed signature")]
    MalformedSignature,

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("signing secret rejected by HMAC")]
    InvalidSecret,
}
