//! Events API envelope decoding.

use serde::Deserialize;
use serde_json::Value;

use switchyard_core::{Event, EventKind};

/// The outer JSON body of an Events API request.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    /// Endpoint ownership check sent when the URL is configured.
    UrlVerification {
        #[serde(default)]
        token: Option<String>,
        challenge: String,
    },

    /// A subscribed event occurred.
    EventCallback {
        #[serde(default)]
        token: Option<String>,
        #[serde(default)]
        team_id: Option<String>,
        #[serde(default)]
        event_id: Option<String>,
        event: Value,
    },

    /// Any other envelope type, such as `app_rate_limited`.
    #[serde(other)]
    Other,
}

impl Envelope {
    /// Parses a raw request body.
    pub fn parse(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }

    /// Returns the verification token carried by the envelope, if any.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::UrlVerification { token, .. } | Self::EventCallback { token, .. } => {
                token.as_deref()
            }
            Self::Other => None,
        }
    }
}

/// The outcome of decoding an inner event.
#[derive(Debug)]
pub enum InnerEvent {
    /// A supported event.
    Known(Event),
    /// An event whose `type` is not modelled; carries the type tag.
    Unsupported(String),
}

/// Decodes the inner `event` object of an `event_callback`.
///
/// Unmodelled event types are reported as [`InnerEvent::Unsupported`] rather
/// than as errors; a supported type with a malformed body is an error.
pub fn decode_event(event: Value) -> serde_json::Result<InnerEvent> {
    let tag = event
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_default();

    if tag.parse::<EventKind>().is_err() {
        return Ok(InnerEvent::Unsupported(tag));
    }

    serde_json::from_value(event).map(InnerEvent::Known)
}
