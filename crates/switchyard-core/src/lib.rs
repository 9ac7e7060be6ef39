//! # Switchyard Core
//!
//! Data model shared by every Switchyard crate:
//!
//! - [`Event`] / [`EventKind`] – the closed set of inbound webhook events
//! - [`FromEvent`] – narrowing a general event to one payload type
//! - [`Command`] / [`Message`] – slash commands and their responses
//! - [`Client`] – the outbound platform capability handed to handlers
//!
//! Nothing here knows about routing or HTTP; see `switchyard-framework` and
//! `switchyard-transport`.

pub mod client;
pub mod command;
pub mod error;
pub mod event;

pub use client::{BoxedClient, Client};
pub use command::{Command, Message, ResponseType};
pub use error::{ApiError, ApiResult, UnknownEventKind};
pub use event::{
    AppHomeOpenedEvent, AppMentionEvent, AppUninstalledEvent, Event, EventKind, FromEvent,
    LinkSharedEvent, MemberJoinedChannelEvent, MessageEvent, PinAddedEvent, PinRemovedEvent,
    SharedLink, TeamJoinEvent,
};
