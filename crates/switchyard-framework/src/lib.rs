//! # Switchyard Framework
//!
//! The dispatch core of Switchyard.
//!
//! This layer provides:
//! - [`EventFilter`] predicates and the any-of rule that gates chain entries
//! - The ordered [`HandlerChain`] with its single-use [`Next`] continuation
//! - The exact-match slash [`CommandTable`]
//! - [`TypedAdapter`] for handlers that take one payload type
//! - The [`Router`] tying a client, a chain and a command table together
//!
//! The framework knows nothing about HTTP. The transport layer decodes
//! requests into [`Event`](switchyard_core::Event)s and
//! [`Command`](switchyard_core::Command)s and hands them to a shared router.

pub mod chain;
pub mod command;
pub mod error;
pub mod filter;
pub mod handler;
pub mod router;
pub mod typed;

#[cfg(test)]
pub(crate) mod testing;

pub use chain::{HandlerChain, HandlerEntry};
pub use command::{CommandEntry, CommandTable};
pub use error::{DispatchError, DispatchResult};
pub use filter::{EventFilter, PredicateFn, any_match};
pub use handler::{
    BoxedCommandHandler, BoxedEventHandler, CommandHandler, CommandHandlerFn, CommandResult,
    EventHandler, EventHandlerFn, HandlerResult, Next,
};
pub use router::Router;
pub use tower::BoxError;
pub use typed::{TypedAdapter, typed_entry};
