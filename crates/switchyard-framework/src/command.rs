//! The slash-command table.
//!
//! Commands are routed by exact name. The table is scanned in registration
//! order and the first entry whose name equals the invoked command handles
//! it; later entries with the same name are never reached.

use std::fmt;

use tracing::trace;

use switchyard_core::{BoxedClient, Command, Message};

use crate::error::{DispatchError, DispatchResult};
use crate::handler::BoxedCommandHandler;

/// A named command handler.
#[derive(Clone)]
pub struct CommandEntry {
    name: String,
    handler: BoxedCommandHandler,
}

impl CommandEntry {
    /// Creates an entry for `name` (including the leading slash).
    pub fn new(name: impl Into<String>, handler: BoxedCommandHandler) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }

    /// Returns the command name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Registered command handlers, in registration order.
#[derive(Clone, Default, Debug)]
pub struct CommandTable {
    entries: Vec<CommandEntry>,
}

impl CommandTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an entry.
    pub fn push(&mut self, entry: CommandEntry) {
        self.entries.push(entry);
    }

    /// Returns the number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the entry that would handle `name`.
    pub fn find(&self, name: &str) -> Option<&CommandEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Runs the first handler registered for `command.command`.
    pub async fn dispatch(&self, command: Command, client: &BoxedClient) -> DispatchResult<Message> {
        let Some(entry) = self.find(&command.command) else {
            return Err(DispatchError::no_matching_command(command.command));
        };

        trace!(command = %entry.name, "Invoking command handler");
        entry
            .handler
            .call(command, BoxedClient::clone(client))
            .await
            .map_err(DispatchError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::CommandHandlerFn;
    use crate::testing::{MockClient, counter};
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    fn reply(text: &'static str) -> BoxedCommandHandler {
        Arc::new(CommandHandlerFn::new(move |_cmd: Command, _client| async move {
            Ok(Message::text(text))
        }))
    }

    #[tokio::test]
    async fn test_empty_table_has_no_match() {
        let table = CommandTable::new();
        let err = table
            .dispatch(Command::new("/deploy", "prod"), &MockClient::boxed())
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::NoMatchingCommand { ref command } if command == "/deploy"));
    }

    #[tokio::test]
    async fn test_exact_name_match() {
        let mut table = CommandTable::new();
        table.push(CommandEntry::new("/status", reply("all green")));
        table.push(CommandEntry::new("/deploy", reply("deploying")));

        let msg = table
            .dispatch(Command::new("/deploy", ""), &MockClient::boxed())
            .await
            .unwrap();
        assert_eq!(msg.text, "deploying");

        let err = table
            .dispatch(Command::new("/deploy-all", ""), &MockClient::boxed())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "no handler for command `/deploy-all`");
    }

    #[tokio::test]
    async fn test_first_registration_wins() {
        let (first, first_hits) = counter();
        let (second, second_hits) = counter();

        let mut table = CommandTable::new();
        table.push(CommandEntry::new(
            "/ping",
            Arc::new(CommandHandlerFn::new(move |_cmd: Command, _client| {
                first_hits.fetch_add(1, Ordering::SeqCst);
                async { Ok(Message::text("first")) }
            })),
        ));
        table.push(CommandEntry::new(
            "/ping",
            Arc::new(CommandHandlerFn::new(move |_cmd: Command, _client| {
                second_hits.fetch_add(1, Ordering::SeqCst);
                async { Ok(Message::text("second")) }
            })),
        ));

        for _ in 0..3 {
            let msg = table
                .dispatch(Command::new("/ping", ""), &MockClient::boxed())
                .await
                .unwrap();
            assert_eq!(msg.text, "first");
        }
        assert_eq!(first.load(Ordering::SeqCst), 3);
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_match_runs_no_handler() {
        let (hits, counted) = counter();
        let mut table = CommandTable::new();
        table.push(CommandEntry::new(
            "/ping",
            Arc::new(CommandHandlerFn::new(move |_cmd: Command, _client| {
                counted.fetch_add(1, Ordering::SeqCst);
                async { Ok(Message::text("pong")) }
            })),
        ));

        let result = table
            .dispatch(Command::new("/PING", ""), &MockClient::boxed())
            .await;

        assert!(result.is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_error_passes_through() {
        let mut table = CommandTable::new();
        table.push(CommandEntry::new(
            "/fail",
            Arc::new(CommandHandlerFn::new(|_cmd: Command, _client| async {
                Err("backend offline".into())
            })),
        ));

        let err = table
            .dispatch(Command::new("/fail", ""), &MockClient::boxed())
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Handler(_)));
        assert_eq!(err.to_string(), "backend offline");
    }
}
