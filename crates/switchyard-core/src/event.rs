//! Event model for Switchyard.
//!
//! Inbound webhook events are decoded into the closed [`Event`] enum. Each
//! variant wraps a payload struct carrying the fields for that kind:
//!
//! ```text
//! Event
//! ├── Message(MessageEvent)                         channel
//! ├── AppMention(AppMentionEvent)                   channel
//! ├── PinAdded(PinAddedEvent)                       channel
//! ├── PinRemoved(PinRemovedEvent)                   channel
//! ├── MemberJoinedChannel(MemberJoinedChannelEvent) channel
//! ├── LinkShared(LinkSharedEvent)                   channel
//! ├── AppHomeOpened(AppHomeOpenedEvent)             channel
//! ├── TeamJoin(TeamJoinEvent)
//! └── AppUninstalled(AppUninstalledEvent)
//! ```
//!
//! The variant tag is the event's [`EventKind`]. Because the enum is closed,
//! every accessor below is an exhaustive `match`; adding a variant forces a
//! decision about its channel everywhere it matters.
//!
//! # Typed extraction
//!
//! [`FromEvent`] narrows a general `Event` to one payload type:
//!
//! ```rust,ignore
//! use switchyard_core::{Event, FromEvent, MessageEvent};
//!
//! if let Some(msg) = MessageEvent::from_event(&event) {
//!     println!("{}: {}", msg.channel, msg.text);
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::UnknownEventKind;

// ============================================================================
// EventKind
// ============================================================================

/// The variant tag of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Message,
    AppMention,
    PinAdded,
    PinRemoved,
    MemberJoinedChannel,
    LinkShared,
    AppHomeOpened,
    TeamJoin,
    AppUninstalled,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 9] = [
        EventKind::Message,
        EventKind::AppMention,
        EventKind::PinAdded,
        EventKind::PinRemoved,
        EventKind::MemberJoinedChannel,
        EventKind::LinkShared,
        EventKind::AppHomeOpened,
        EventKind::TeamJoin,
        EventKind::AppUninstalled,
    ];

    /// Returns the wire tag used in the `type` field of a webhook event.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Message => "message",
            EventKind::AppMention => "app_mention",
            EventKind::PinAdded => "pin_added",
            EventKind::PinRemoved => "pin_removed",
            EventKind::MemberJoinedChannel => "member_joined_channel",
            EventKind::LinkShared => "link_shared",
            EventKind::AppHomeOpened => "app_home_opened",
            EventKind::TeamJoin => "team_join",
            EventKind::AppUninstalled => "app_uninstalled",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// A message was posted to a channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub channel: String,
    /// Author; absent for some bot and system messages.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
    pub ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
    /// `channel`, `group`, `im` or `mpim`.
    #[serde(default)]
    pub channel_type: Option<String>,
    /// Message subtype (`bot_message`, `message_changed`, ...).
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
}

/// The app was mentioned in a channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppMentionEvent {
    pub channel: String,
    pub user: String,
    #[serde(default)]
    pub text: String,
    pub ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
}

/// An item was pinned in a channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PinAddedEvent {
    #[serde(alias = "channel_id")]
    pub channel: String,
    pub user: String,
    /// The pinned item as sent by the platform.
    #[serde(default)]
    pub item: Value,
    #[serde(default)]
    pub event_ts: String,
}

/// An item was unpinned from a channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PinRemovedEvent {
    #[serde(alias = "channel_id")]
    pub channel: String,
    pub user: String,
    #[serde(default)]
    pub item: Value,
    /// Whether the channel still has pinned items.
    #[serde(default)]
    pub has_pins: bool,
    #[serde(default)]
    pub event_ts: String,
}

/// A user joined a channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberJoinedChannelEvent {
    pub channel: String,
    pub user: String,
    #[serde(default)]
    pub channel_type: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub inviter: Option<String>,
}

/// A link inside a [`LinkSharedEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedLink {
    pub domain: String,
    pub url: String,
}

/// A message containing links to a registered domain was posted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkSharedEvent {
    pub channel: String,
    pub user: String,
    #[serde(default)]
    pub message_ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default)]
    pub links: Vec<SharedLink>,
}

/// A user opened the app's home tab or messages tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppHomeOpenedEvent {
    pub channel: String,
    pub user: String,
    /// `home` or `messages`.
    #[serde(default)]
    pub tab: String,
    #[serde(default)]
    pub event_ts: String,
}

/// A new member joined the workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamJoinEvent {
    /// Full user object.
    #[serde(default)]
    pub user: Value,
}

/// The app was uninstalled from the workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppUninstalledEvent {
    #[serde(default)]
    pub event_ts: Option<String>,
}

// ============================================================================
// Event
// ============================================================================

/// A decoded inbound event.
///
/// The kind is fixed by the variant and cannot change after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Message(MessageEvent),
    AppMention(AppMentionEvent),
    PinAdded(PinAddedEvent),
    PinRemoved(PinRemovedEvent),
    MemberJoinedChannel(MemberJoinedChannelEvent),
    LinkShared(LinkSharedEvent),
    AppHomeOpened(AppHomeOpenedEvent),
    TeamJoin(TeamJoinEvent),
    AppUninstalled(AppUninstalledEvent),
}

impl Event {
    /// Returns the variant tag.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Message(_) => EventKind::Message,
            Event::AppMention(_) => EventKind::AppMention,
            Event::PinAdded(_) => EventKind::PinAdded,
            Event::PinRemoved(_) => EventKind::PinRemoved,
            Event::MemberJoinedChannel(_) => EventKind::MemberJoinedChannel,
            Event::LinkShared(_) => EventKind::LinkShared,
            Event::AppHomeOpened(_) => EventKind::AppHomeOpened,
            Event::TeamJoin(_) => EventKind::TeamJoin,
            Event::AppUninstalled(_) => EventKind::AppUninstalled,
        }
    }

    /// Returns the channel this event belongs to, for channel-scoped kinds.
    pub fn channel(&self) -> Option<&str> {
        match self {
            Event::Message(e) => Some(&e.channel),
            Event::AppMention(e) => Some(&e.channel),
            Event::PinAdded(e) => Some(&e.channel),
            Event::PinRemoved(e) => Some(&e.channel),
            Event::MemberJoinedChannel(e) => Some(&e.channel),
            Event::LinkShared(e) => Some(&e.channel),
            Event::AppHomeOpened(e) => Some(&e.channel),
            Event::TeamJoin(_) | Event::AppUninstalled(_) => None,
        }
    }

    /// Returns `true` if this event narrows to `T`.
    pub fn is<T: FromEvent>(&self) -> bool {
        self.kind() == T::KIND
    }

    /// Narrows this event to the payload type `T`, cloning it.
    pub fn extract<T: FromEvent>(&self) -> Option<T> {
        T::from_event(self)
    }
}

// ============================================================================
// FromEvent
// ============================================================================

/// A payload type that can be narrowed out of a general [`Event`].
///
/// Implemented for every payload struct. `KIND` is the variant the type
/// belongs to; `from_event` returns `None` for any other variant.
pub trait FromEvent: Sized + Clone + Send + Sync + 'static {
    /// The event kind this payload belongs to.
    const KIND: EventKind;

    /// Attempts to narrow `event` to this payload type.
    fn from_event(event: &Event) -> Option<Self>;
}

macro_rules! impl_from_event {
    ($($variant:ident => $payload:ty),* $(,)?) => {
        $(
            impl FromEvent for $payload {
                const KIND: EventKind = EventKind::$variant;

                fn from_event(event: &Event) -> Option<Self> {
                    match event {
                        Event::$variant(inner) => Some(inner.clone()),
                        _ => None,
                    }
                }
            }

            impl From<$payload> for Event {
                fn from(inner: $payload) -> Self {
                    Event::$variant(inner)
                }
            }
        )*
    };
}

impl_from_event! {
    Message => MessageEvent,
    AppMention => AppMentionEvent,
    PinAdded => PinAddedEvent,
    PinRemoved => PinRemovedEvent,
    MemberJoinedChannel => MemberJoinedChannelEvent,
    LinkShared => LinkSharedEvent,
    AppHomeOpened => AppHomeOpenedEvent,
    TeamJoin => TeamJoinEvent,
    AppUninstalled => AppUninstalledEvent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>(), Ok(kind));
        }
        assert_eq!(
            "reaction_added".parse::<EventKind>(),
            Err(UnknownEventKind("reaction_added".into()))
        );
    }

    #[test]
    fn test_deserialize_tagged_message() {
        let event: Event = serde_json::from_value(json!({
            "type": "message",
            "channel": "C123",
            "user": "U1",
            "text": "hello",
            "ts": "1700000000.000100"
        }))
        .unwrap();

        assert_eq!(event.kind(), EventKind::Message);
        assert_eq!(event.channel(), Some("C123"));
        let msg = event.extract::<MessageEvent>().unwrap();
        assert_eq!(msg.text, "hello");
        assert_eq!(msg.user.as_deref(), Some("U1"));
    }

    #[test]
    fn test_pin_added_accepts_channel_id() {
        let event: Event = serde_json::from_value(json!({
            "type": "pin_added",
            "channel_id": "C9",
            "user": "U1",
            "item": {"type": "message"},
            "event_ts": "1.2"
        }))
        .unwrap();

        assert_eq!(event.channel(), Some("C9"));
    }

    #[test]
    fn test_channel_less_kinds() {
        let join = Event::from(TeamJoinEvent::default());
        let gone = Event::from(AppUninstalledEvent::default());
        assert_eq!(join.channel(), None);
        assert_eq!(gone.channel(), None);
    }

    #[test]
    fn test_extract_wrong_kind() {
        let event = Event::from(AppMentionEvent {
            channel: "C1".into(),
            user: "U1".into(),
            ..Default::default()
        });

        assert!(event.is::<AppMentionEvent>());
        assert!(!event.is::<MessageEvent>());
        assert!(event.extract::<MessageEvent>().is_none());
    }
}
