//! Web API client over `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::ClientBuilder;
use serde_json::Value;
use tracing::{debug, trace};

use switchyard_core::{ApiError, ApiResult, Client};

/// Settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL that method names are appended to.
    pub base_url: String,
    /// Bot token sent as `Authorization: Bearer ...`.
    pub bot_token: Option<String>,
    pub timeout: Duration,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://slack.com/api".to_string(),
            bot_token: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// A [`Client`] that calls the platform's Web API over HTTPS.
///
/// Every method is a JSON `POST` to `{base_url}/{method}`. Responses with
/// `"ok": false` become [`ApiError::Platform`].
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Creates a client from `config`.
    pub fn new(config: ApiClientConfig) -> ApiResult<Self> {
        let http = ClientBuilder::new()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::transport("client.build", e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.bot_token,
        })
    }

    /// Returns the full URL for `method`.
    pub fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("has_token", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Client for ApiClient {
    async fn call_api(&self, method: &str, params: Value) -> ApiResult<Value> {
        let token = self.token.as_deref().ok_or(ApiError::MissingToken)?;

        trace!(method, "Calling Web API");
        let response = self
            .http
            .post(self.method_url(method))
            .bearer_auth(token)
            .json(&params)
            .send()
            .await
            .map_err(|e| ApiError::transport(method, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::transport(
                method,
                format!("HTTP {} error: {}", status.as_u16(), text),
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse {
                method: method.to_string(),
                reason: e.to_string(),
            })?;

        check_ok(method, body)
    }
}

/// Maps an `"ok": false` body to [`ApiError::Platform`].
fn check_ok(method: &str, body: Value) -> ApiResult<Value> {
    match body.get("ok").and_then(Value::as_bool) {
        Some(true) => Ok(body),
        Some(false) => {
            let error = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error");
            debug!(method, error, "Web API call rejected");
            Err(ApiError::platform(method, error))
        }
        None => Err(ApiError::InvalidResponse {
            method: method.to_string(),
            reason: "response has no `ok` field".to_string(),
        }),
    }
}
