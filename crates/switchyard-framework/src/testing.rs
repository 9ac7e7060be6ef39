//! Shared fixtures for unit tests.

use std::sync::atomic::AtomicUsize;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use switchyard_core::{ApiResult, BoxedClient, Client, Event, MessageEvent, PinAddedEvent};

/// A client that records every call and always succeeds.
#[derive(Default)]
pub(crate) struct MockClient {
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockClient {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn boxed() -> BoxedClient {
        Self::new()
    }

    pub(crate) fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Client for MockClient {
    async fn call_api(&self, method: &str, params: Value) -> ApiResult<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params));
        Ok(json!({ "ok": true }))
    }
}

/// Two handles to one counter: one to inspect, one to move into a handler.
pub(crate) fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    (Arc::clone(&count), count)
}

pub(crate) fn message(channel: &str) -> Event {
    Event::Message(MessageEvent {
        channel: channel.to_string(),
        user: Some("U1".to_string()),
        text: "hello".to_string(),
        ts: "1700000000.000100".to_string(),
        ..Default::default()
    })
}

pub(crate) fn pin_added(channel: &str) -> Event {
    Event::PinAdded(PinAddedEvent {
        channel: channel.to_string(),
        user: "U1".to_string(),
        ..Default::default()
    })
}
