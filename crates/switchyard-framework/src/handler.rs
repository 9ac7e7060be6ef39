//! Handler traits and the chain continuation.
//!
//! Event handlers receive the event, the shared client handle and a [`Next`]
//! continuation. Consuming `Next` hands control to the following matching
//! entry; returning without consuming it ends the chain.
//!
//! ```rust,ignore
//! use switchyard_framework::{HandlerResult, Next};
//!
//! async fn audit(event: Arc<Event>, _client: BoxedClient, next: Next) -> HandlerResult {
//!     tracing::info!(kind = %event.kind(), "event received");
//!     next.proceed();
//!     Ok(())
//! }
//! ```
//!
//! Plain async functions and closures with the right signature are accepted
//! by the registration methods on [`Router`](crate::Router); they are wrapped
//! in [`EventHandlerFn`] / [`CommandHandlerFn`] internally.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::oneshot;
use tower::BoxError;

use switchyard_core::{BoxedClient, Command, Event, Message};

/// What an event handler returns.
pub type HandlerResult = Result<(), BoxError>;

/// What a command handler returns.
pub type CommandResult = Result<Message, BoxError>;

// ============================================================================
// Next
// ============================================================================

/// Single-use continuation handed to each event handler.
///
/// Every method takes `self`, so control can be passed on at most once.
/// Dropping a `Next` without calling it makes the current handler the last
/// one to run. A `Next` that outlives its dispatch (for example, moved into
/// a spawned task) can still be called; the call is ignored.
#[derive(Debug)]
pub struct Next {
    slot: oneshot::Sender<Option<BoxError>>,
}

impl Next {
    /// Continues with the next matching entry, clearing any carried error.
    pub fn proceed(self) {
        self.forward(None);
    }

    /// Continues with the next matching entry, carrying `err`.
    ///
    /// If no later entry replaces it, `err` becomes the dispatch result.
    pub fn fail(self, err: impl Into<BoxError>) {
        self.forward(Some(err.into()));
    }

    /// Continues with the next matching entry, carrying `err` if present.
    pub fn forward(self, err: Option<BoxError>) {
        // The receiver is gone once the dispatch has finished.
        let _ = self.slot.send(err);
    }

    /// Creates a continuation together with the receiving end the chain
    /// inspects once the handler returns.
    pub(crate) fn channel() -> (Self, Forwarded) {
        let (tx, rx) = oneshot::channel();
        (Self { slot: tx }, Forwarded { slot: rx })
    }
}

/// The chain's side of a [`Next`].
pub(crate) struct Forwarded {
    slot: oneshot::Receiver<Option<BoxError>>,
}

impl Forwarded {
    /// Returns `Some(carried_error)` if the handler consumed its `Next`.
    pub(crate) fn take(mut self) -> Option<Option<BoxError>> {
        self.slot.try_recv().ok()
    }
}

// ============================================================================
// EventHandler
// ============================================================================

/// A handler in the event chain.
pub trait EventHandler: Send + Sync + 'static {
    /// Handles `event`. Call `next` to pass control on.
    fn call(&self, event: Arc<Event>, client: BoxedClient, next: Next)
    -> BoxFuture<'static, HandlerResult>;
}

/// A shared, type-erased event handler.
pub type BoxedEventHandler = Arc<dyn EventHandler>;

/// Adapts an async function or closure into an [`EventHandler`].
#[derive(Clone)]
pub struct EventHandlerFn<F> {
    f: F,
}

impl<F> EventHandlerFn<F> {
    pub fn new<Fut>(f: F) -> Self
    where
        F: Fn(Arc<Event>, BoxedClient, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self { f }
    }
}

impl<F, Fut> EventHandler for EventHandlerFn<F>
where
    F: Fn(Arc<Event>, BoxedClient, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(
        &self,
        event: Arc<Event>,
        client: BoxedClient,
        next: Next,
    ) -> BoxFuture<'static, HandlerResult> {
        (self.f)(event, client, next).boxed()
    }
}

// ============================================================================
// CommandHandler
// ============================================================================

/// A slash-command handler.
pub trait CommandHandler: Send + Sync + 'static {
    /// Handles `command` and produces the response message.
    fn call(&self, command: Command, client: BoxedClient) -> BoxFuture<'static, CommandResult>;
}

/// A shared, type-erased command handler.
pub type BoxedCommandHandler = Arc<dyn CommandHandler>;

/// Adapts an async function or closure into a [`CommandHandler`].
#[derive(Clone)]
pub struct CommandHandlerFn<F> {
    f: F,
}

impl<F> CommandHandlerFn<F> {
    pub fn new<Fut>(f: F) -> Self
    where
        F: Fn(Command, BoxedClient) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CommandResult> + Send + 'static,
    {
        Self { f }
    }
}

impl<F, Fut> CommandHandler for CommandHandlerFn<F>
where
    F: Fn(Command, BoxedClient) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = CommandResult> + Send + 'static,
{
    fn call(&self, command: Command, client: BoxedClient) -> BoxFuture<'static, CommandResult> {
        (self.f)(command, client).boxed()
    }
}
