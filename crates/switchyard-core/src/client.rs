//! The outbound client handle.
//!
//! A [`Client`] is the capability handlers use to call the platform's Web
//! API. The router owns one [`BoxedClient`] and hands a clone of the `Arc`
//! to every handler; it never calls the client itself.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::command::Message;
use crate::error::{ApiError, ApiResult};

/// Outbound access to the chat platform.
///
/// Implementations are shared across concurrent dispatches, so any mutable
/// connection state must be synchronized internally.
///
/// Concrete clients only need [`call_api`](Client::call_api); the typed
/// helpers are built on top of it.
#[async_trait]
pub trait Client: Send + Sync + 'static {
    /// Calls a Web API method with JSON parameters and returns the JSON body.
    ///
    /// # Arguments
    ///
    /// * `method` - The API method name (e.g., "chat.postMessage")
    /// * `params` - JSON object with the method arguments
    async fn call_api(&self, method: &str, params: Value) -> ApiResult<Value>;

    /// Posts `message` to `channel` and returns the platform's response.
    async fn post_message(&self, channel: &str, message: &Message) -> ApiResult<Value> {
        let mut params = serde_json::to_value(message)?;
        match params.as_object_mut() {
            Some(map) => {
                map.insert("channel".to_string(), Value::String(channel.to_string()));
            }
            None => return Err(ApiError::Serialize("message is not an object".into())),
        }
        self.call_api("chat.postMessage", params).await
    }
}

/// A shared client handle.
pub type BoxedClient = Arc<dyn Client>;
