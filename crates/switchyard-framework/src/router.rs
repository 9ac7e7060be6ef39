//! The router: one client, one event chain, one command table.
//!
//! A [`Router`] is assembled during setup and then shared (typically behind
//! an `Arc`) by the transport layer, which calls [`Router::dispatch_event`]
//! and [`Router::dispatch_command`] for every inbound request.
//!
//! ```rust,ignore
//! use switchyard_framework::{EventFilter, Router};
//! use switchyard_core::{EventKind, Message, PinAddedEvent};
//!
//! let router = Router::new(client)
//!     // Runs for every event, then hands over.
//!     .with_event_handler([], |event, _client, next| async move {
//!         tracing::info!(kind = %event.kind(), "received");
//!         next.proceed();
//!         Ok(())
//!     })
//!     .with_typed_event_handler(|pin: PinAddedEvent, client, _next| async move {
//!         client.post_message(&pin.channel, &Message::text("Pinned!")).await?;
//!         Ok(())
//!     })
//!     .with_command_handler("/ping", |_cmd, _client| async { Ok(Message::text("pong")) });
//! ```

use std::future::Future;
use std::sync::Arc;

use tracing::{Instrument, debug_span};

use switchyard_core::{BoxedClient, Command, Event, FromEvent, Message};

use crate::chain::{HandlerChain, HandlerEntry};
use crate::command::{CommandEntry, CommandTable};
use crate::error::DispatchResult;
use crate::filter::EventFilter;
use crate::handler::{CommandHandlerFn, CommandResult, EventHandlerFn, HandlerResult, Next};
use crate::typed::typed_entry;

/// Routes inbound events and slash commands to registered handlers.
///
/// Registration happens through `&mut self` before the router is shared;
/// dispatch only needs `&self`, so any number of dispatches can run
/// concurrently against one router.
#[derive(Clone)]
pub struct Router {
    client: BoxedClient,
    chain: HandlerChain,
    commands: CommandTable,
}

impl Router {
    /// Creates an empty router that hands `client` to every handler.
    pub fn new(client: BoxedClient) -> Self {
        Self {
            client,
            chain: HandlerChain::new(),
            commands: CommandTable::new(),
        }
    }

    /// Returns the client handed to handlers.
    pub fn client(&self) -> &BoxedClient {
        &self.client
    }

    /// Returns the event handler chain.
    pub fn chain(&self) -> &HandlerChain {
        &self.chain
    }

    /// Returns the command table.
    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Appends an event handler gated by `filters`.
    ///
    /// The handler runs for an event if any filter accepts it; an empty
    /// filter set accepts every event.
    pub fn add_event_handler<F, Fut>(
        &mut self,
        filters: impl IntoIterator<Item = EventFilter>,
        handler: F,
    ) -> &mut Self
    where
        F: Fn(Arc<Event>, BoxedClient, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.add_entry(HandlerEntry::new(
            filters,
            Arc::new(EventHandlerFn::new(handler)),
        ))
    }

    /// Appends a prebuilt entry to the chain.
    pub fn add_entry(&mut self, entry: HandlerEntry) -> &mut Self {
        self.chain.push(entry);
        self
    }

    /// Appends a handler for one payload type.
    ///
    /// The entry is gated by a kind filter for `T`, and the handler receives
    /// the narrowed payload.
    pub fn add_typed_event_handler<T, F, Fut>(&mut self, handler: F) -> &mut Self
    where
        T: FromEvent,
        F: Fn(T, BoxedClient, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.add_entry(typed_entry(handler))
    }

    /// Registers a handler for the slash command `name` (e.g. `"/deploy"`).
    ///
    /// If `name` is already registered, the earlier handler keeps winning.
    pub fn add_command_handler<F, Fut>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(Command, BoxedClient) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CommandResult> + Send + 'static,
    {
        self.commands.push(CommandEntry::new(
            name,
            Arc::new(CommandHandlerFn::new(handler)),
        ));
        self
    }

    /// Builder form of [`add_event_handler`](Self::add_event_handler).
    pub fn with_event_handler<F, Fut>(
        mut self,
        filters: impl IntoIterator<Item = EventFilter>,
        handler: F,
    ) -> Self
    where
        F: Fn(Arc<Event>, BoxedClient, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.add_event_handler(filters, handler);
        self
    }

    /// Builder form of [`add_typed_event_handler`](Self::add_typed_event_handler).
    pub fn with_typed_event_handler<T, F, Fut>(mut self, handler: F) -> Self
    where
        T: FromEvent,
        F: Fn(T, BoxedClient, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.add_typed_event_handler(handler);
        self
    }

    /// Builder form of [`add_command_handler`](Self::add_command_handler).
    pub fn with_command_handler<F, Fut>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Command, BoxedClient) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CommandResult> + Send + 'static,
    {
        self.add_command_handler(name, handler);
        self
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    /// Runs `event` through the handler chain.
    pub async fn dispatch_event(&self, event: Event) -> DispatchResult<()> {
        let span = debug_span!("dispatch_event", kind = %event.kind());
        self.chain
            .dispatch(Arc::new(event), &self.client)
            .instrument(span)
            .await
    }

    /// Runs `command` through the command table and returns the reply.
    pub async fn dispatch_command(&self, command: Command) -> DispatchResult<Message> {
        let span = debug_span!("dispatch_command", command = %command.command);
        self.commands
            .dispatch(command, &self.client)
            .instrument(span)
            .await
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("chain", &self.chain)
            .field("commands", &self.commands)
            .finish_non_exhaustive()
    }
}
