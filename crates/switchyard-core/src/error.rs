//! Unified error types for the Switchyard core.
//!
//! Dispatch errors live in `switchyard-framework`; this module only covers
//! the data model and the outbound client.

use thiserror::Error;

// =============================================================================
// API Errors
// =============================================================================

/// Errors returned by [`Client`](crate::Client) calls.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, TLS, ...).
    #[error("request to '{method}' failed: {reason}")]
    Transport {
        /// Web API method that was being called.
        method: String,
        /// Reason for failure.
        reason: String,
    },

    /// The platform answered with `"ok": false`.
    #[error("platform rejected '{method}': {error}")]
    Platform {
        /// Web API method that was being called.
        method: String,
        /// Error code reported by the platform (e.g. `channel_not_found`).
        error: String,
    },

    /// The response body could not be understood.
    #[error("invalid response from '{method}': {reason}")]
    InvalidResponse {
        /// Web API method that was being called.
        method: String,
        /// Reason for failure.
        reason: String,
    },

    /// Request parameters could not be serialized.
    #[error("failed to serialize request: {0}")]
    Serialize(String),

    /// No bot token is configured for the client.
    #[error("no API token configured")]
    MissingToken,
}

impl ApiError {
    /// Creates a platform error.
    pub fn platform(method: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Platform {
            method: method.into(),
            error: error.into(),
        }
    }

    /// Creates a transport error.
    pub fn transport(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            method: method.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}

// =============================================================================
// Model Errors
// =============================================================================

/// Returned when parsing an [`EventKind`](crate::EventKind) from an unknown tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event type '{0}'")]
pub struct UnknownEventKind(pub String);

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for client API calls.
pub type ApiResult<T> = Result<T, ApiError>;
