//! Pin Bot
//!
//! A small bot showing the pieces of Switchyard working together:
//!
//! - an audit handler that sees every event and hands over with `next`
//! - a typed handler that thanks whoever pins something
//! - slash commands answered through the command table
//!
//! # Usage
//!
//! ```bash
//! SWITCHYARD_API__BOT_TOKEN=xoxb-... \
//! SWITCHYARD_SERVER__SIGNING_SECRET=... \
//!     cargo run --package pin-bot -- --config switchyard.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use serde_json::json;
use switchyard::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "pin-bot", about = "Thanks people for pinning things")]
struct Args {
    /// Configuration file; searched for when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile (development, production, ...)
    #[arg(short, long)]
    profile: Option<String>,
}

// ============================================================================
// Event handlers
// ============================================================================

/// Logs every event, then lets the rest of the chain run.
async fn audit(event: Arc<Event>, _client: BoxedClient, next: Next) -> HandlerResult {
    info!(kind = %event.kind(), "event received");
    next.proceed();
    Ok(())
}

async fn thank_pinner(pin: PinAddedEvent, client: BoxedClient, _next: Next) -> HandlerResult {
    let reply = Message::text(format!("<@{}> pinned something, thanks!", pin.user));
    client.post_message(&pin.channel, &reply).await?;
    Ok(())
}

// ============================================================================
// Slash commands
// ============================================================================

async fn ping(_command: Command, _client: BoxedClient) -> CommandResult {
    Ok(Message::text("Pong!").ephemeral())
}

async fn pins(command: Command, client: BoxedClient) -> CommandResult {
    let response = client
        .call_api("pins.list", json!({ "channel": command.channel_id }))
        .await?;
    let count = response["items"].as_array().map_or(0, Vec::len);

    Ok(Message::text(format!("This channel has {count} pinned item(s).")).in_channel())
}

async fn help(_command: Command, _client: BoxedClient) -> CommandResult {
    let text = "/ping - check the bot is alive\n\
                /pins - count pinned items in this channel\n\
                /pinhelp - this help";
    Ok(Message::text(text).ephemeral())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder = SwitchyardRuntime::builder();
    if let Some(path) = &args.config {
        builder = builder.config_file(path);
    }
    if let Some(profile) = &args.profile {
        builder = builder.profile(profile);
    }
    let runtime = builder.build()?;

    if runtime.config().api.bot_token.is_none() {
        warn!("No bot token configured; Web API calls will fail");
    }

    let router = runtime
        .router()
        .with_event_handler([], audit)
        .with_typed_event_handler(thank_pinner)
        .with_command_handler("/ping", ping)
        .with_command_handler("/pins", pins)
        .with_command_handler("/pinhelp", help);

    runtime.run(router).await?;

    Ok(())
}
