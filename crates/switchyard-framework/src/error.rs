//! Error types for the Switchyard dispatch core.

use thiserror::Error;
use tower::BoxError;

use switchyard_core::EventKind;

/// The terminal outcome of a failed dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No registered command has the invoked name.
    #[error("no handler for command `{command}`")]
    NoMatchingCommand {
        /// The command name that was invoked.
        command: String,
    },

    /// A typed handler received an event of another kind.
    #[error("event type mismatch: expected '{expected}', got '{actual}'")]
    TypeMismatch {
        /// The kind the typed handler was registered for.
        expected: EventKind,
        /// The kind of the event that reached it.
        actual: EventKind,
    },

    /// An error produced by a handler, passed through as-is.
    #[error(transparent)]
    Handler(BoxError),
}

impl DispatchError {
    /// Creates a `NoMatchingCommand` error.
    pub fn no_matching_command(command: impl Into<String>) -> Self {
        Self::NoMatchingCommand {
            command: command.into(),
        }
    }

    /// Returns the handler error, if this is one.
    pub fn handler_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Handler(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// How a typed adapter reports a kind mismatch through the handler error
/// channel. Only the framework can construct it, so no handler error is
/// ever mistaken for one.
#[derive(Debug, Error)]
#[error("event type mismatch: expected '{expected}', got '{actual}'")]
pub(crate) struct KindMismatch {
    pub(crate) expected: EventKind,
    pub(crate) actual: EventKind,
}

/// Handler errors are wrapped in [`DispatchError::Handler`] untouched. The
/// one exception is the kind-mismatch marker from a typed adapter.
impl From<BoxError> for DispatchError {
    fn from(err: BoxError) -> Self {
        match err.downcast::<KindMismatch>() {
            Ok(mismatch) => Self::TypeMismatch {
                expected: mismatch.expected,
                actual: mismatch.actual,
            },
            Err(other) => Self::Handler(other),
        }
    }
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
