//! Runtime error types.

use thiserror::Error;

use switchyard_core::ApiError;
use switchyard_transport::ServerError;

use crate::config::ConfigError;
use crate::logging::LoggingError;

/// Errors that can occur while starting or running a bot.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Logging setup failed: {0}")]
    Logging(#[from] LoggingError),

    #[error("Web API client setup failed: {0}")]
    Client(#[from] ApiError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("Failed to listen for shutdown signal: {0}")]
    Signal(#[source] std::io::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
