//! The ordered event handler chain.
//!
//! A [`HandlerChain`] is a list of [`HandlerEntry`]s, each a set of filters
//! plus one handler. Dispatching an event walks the entries in registration
//! order:
//!
//! 1. Entries whose filters reject the event are skipped without being called
//! 2. A matching entry's handler is awaited with a fresh [`Next`]
//! 3. If the handler consumed `Next`, the walk continues and the error it
//!    carried (if any) replaces the accumulated one
//! 4. If the handler returned without consuming `Next`, the walk stops and
//!    the accumulated error is the result
//! 5. If the handler returned an error, the walk stops with that error
//!
//! The walk is a plain loop, so chain length does not grow the stack.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use switchyard_core::{BoxedClient, Event};

use crate::error::{DispatchError, DispatchResult};
use crate::filter::{EventFilter, any_match};
use crate::handler::{BoxedEventHandler, Next};

/// One entry in the chain: a filter set and the handler it gates.
#[derive(Clone)]
pub struct HandlerEntry {
    filters: Vec<EventFilter>,
    handler: BoxedEventHandler,
    name: Option<String>,
}

impl HandlerEntry {
    /// Creates an entry. An empty filter set matches every event.
    pub fn new(filters: impl IntoIterator<Item = EventFilter>, handler: BoxedEventHandler) -> Self {
        Self {
            filters: filters.into_iter().collect(),
            handler,
            name: None,
        }
    }

    /// Sets a name used in diagnostics.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the diagnostic name, if set.
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the entry's filters.
    pub fn filters(&self) -> &[EventFilter] {
        &self.filters
    }

    /// Returns `true` if any filter accepts `event`, or there are none.
    pub fn matches(&self, event: &Event) -> bool {
        any_match(&self.filters, event)
    }
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("name", &self.name)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}

/// An ordered list of handler entries.
///
/// Built during setup and read-only afterwards; any number of dispatches
/// may walk the same chain concurrently.
#[derive(Clone, Default, Debug)]
pub struct HandlerChain {
    entries: Vec<HandlerEntry>,
}

impl HandlerChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an entry. Entries run in the order they are pushed.
    pub fn push(&mut self, entry: HandlerEntry) {
        self.entries.push(entry);
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the chain has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entries in dispatch order.
    pub fn entries(&self) -> &[HandlerEntry] {
        &self.entries
    }

    /// Walks the chain for `event`.
    ///
    /// Returns the accumulated error at the point the walk ended, or the
    /// error a handler returned directly.
    pub async fn dispatch(&self, event: Arc<Event>, client: &BoxedClient) -> DispatchResult<()> {
        let mut accumulated = None;

        for (index, entry) in self.entries.iter().enumerate() {
            let entry_name = entry.get_name().unwrap_or("unnamed");

            if !entry.matches(&event) {
                trace!(index, entry = entry_name, "Entry filters rejected event, skipping");
                continue;
            }

            trace!(index, entry = entry_name, "Invoking handler");

            let (next, forwarded) = Next::channel();
            entry
                .handler
                .call(Arc::clone(&event), Arc::clone(client), next)
                .await
                .map_err(DispatchError::from)?;

            match forwarded.take() {
                Some(carried) => accumulated = carried,
                None => {
                    debug!(index, entry = entry_name, "Handler ended the chain");
                    break;
                }
            }
        }

        accumulated.map_or(Ok(()), |err| Err(DispatchError::from(err)))
    }
}
