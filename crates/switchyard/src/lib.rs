//! # Switchyard
//!
//! Webhook dispatch for Slack-style chat bots.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────────────────┐
//! │ POST /events │────▶│ HandlerChain                 │
//! │  (envelope)  │     │  H1 ─next─▶ H2 ─next─▶ ...   │──▶ Client (Web API)
//! ├──────────────┤     ├──────────────────────────────┤
//! │ POST /cmds   │────▶│ CommandTable  "/ping" → h    │──▶ Message reply
//! └──────────────┘     └──────────────────────────────┘
//! ```
//!
//! - **Transport**: verifies and decodes inbound requests
//! - **Router**: owns the client, the handler chain and the command table
//! - **Handlers**: async closures; event handlers pass control on with [`Next`](prelude::Next)
//! - **Runtime**: configuration, logging, serving until shutdown
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use switchyard::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = SwitchyardRuntime::builder().build()?;
//!
//!     let router = runtime
//!         .router()
//!         .with_typed_event_handler(|pin: PinAddedEvent, client, _next| async move {
//!             client.post_message(&pin.channel, &Message::text("Pinned!")).await?;
//!             Ok(())
//!         })
//!         .with_command_handler("/ping", |_cmd, _client| async { Ok(Message::text("pong")) });
//!
//!     runtime.run(router).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` (default): TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use switchyard_core as core;
pub use switchyard_framework as framework;
pub use switchyard_runtime as runtime;
pub use switchyard_transport as transport;

/// Commonly used types for building a bot.
///
/// ```rust,ignore
/// use switchyard::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use switchyard_runtime::{SwitchyardConfig, SwitchyardRuntime};

    // Dispatch
    pub use switchyard_framework::{
        BoxError, CommandResult, DispatchError, EventFilter, HandlerResult, Next, Router,
    };

    // Platform model
    pub use switchyard_core::{
        BoxedClient, Client, Command, Event, EventKind, FromEvent, Message, ResponseType,
    };
    pub use switchyard_core::{
        AppMentionEvent, MemberJoinedChannelEvent, MessageEvent, PinAddedEvent, PinRemovedEvent,
    };

    // Logging macros
    pub use switchyard_runtime::prelude::*;
}
