//! The webhook HTTP server.
//!
//! Two POST routes are served from one listener:
//!
//! - the events path receives Events API envelopes and feeds inner events to
//!   [`Router::dispatch_event`]
//! - the commands path receives form-encoded slash commands and answers with
//!   the JSON [`Message`] from [`Router::dispatch_command`]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, info_span, warn};

use switchyard_core::{Command, Message};
use switchyard_framework::Router;

use crate::envelope::{Envelope, InnerEvent, decode_event};
use crate::error::{ServerError, ServerResult, VerifyError};
use crate::signature::{SIGNATURE_HEADER, SignatureVerifier, TIMESTAMP_HEADER};

/// Listener and endpoint settings for [`WebhookServer`].
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub host: String,
    pub port: u16,
    pub events_path: String,
    pub commands_path: String,
    /// Expected `token` in event envelopes; unchecked when `None`.
    pub verification_token: Option<String>,
    /// Secret for slash-command signatures; unchecked when `None`.
    pub signing_secret: Option<String>,
    pub max_timestamp_skew: Duration,
    /// Upper bound on a single dispatch.
    pub request_timeout: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            events_path: "/slack/events".to_string(),
            commands_path: "/slack/commands".to_string(),
            verification_token: None,
            signing_secret: None,
            max_timestamp_skew: Duration::from_secs(300),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl WebhookConfig {
    /// Returns `host:port`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Shared state for the endpoint handlers.
struct ServerState {
    router: Arc<Router>,
    verification_token: Option<String>,
    verifier: Option<SignatureVerifier>,
    request_timeout: Duration,
}

/// Serves the events and commands endpoints for one [`Router`].
pub struct WebhookServer {
    config: WebhookConfig,
    router: Arc<Router>,
}

impl WebhookServer {
    /// Creates a server for `router`.
    pub fn new(config: WebhookConfig, router: Arc<Router>) -> Self {
        Self { config, router }
    }

    /// Builds the axum application without binding a socket.
    pub fn app(&self) -> axum::Router {
        let state = Arc::new(ServerState {
            router: Arc::clone(&self.router),
            verification_token: self.config.verification_token.clone(),
            verifier: self
                .config
                .signing_secret
                .as_ref()
                .map(|secret| SignatureVerifier::new(secret, self.config.max_timestamp_skew)),
            request_timeout: self.config.request_timeout,
        });

        axum::Router::new()
            .route(&self.config.events_path, post(events_handler))
            .route(&self.config.commands_path, post(commands_handler))
            .with_state(state)
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    info_span!(
                        "webhook_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                }),
            )
    }

    /// Binds the listener and serves until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        info!(
            addr = %local_addr,
            events = %self.config.events_path,
            commands = %self.config.commands_path,
            "Webhook server listening"
        );

        axum::serve(listener, self.app())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Webhook server stopped");
        Ok(())
    }

    /// Binds the listener and serves on a background task.
    pub async fn spawn(self) -> ServerResult<ServerHandle> {
        let addr = self.config.bind_addr();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;
        let app = self.app();

        info!(
            addr = %local_addr,
            events = %self.config.events_path,
            commands = %self.config.commands_path,
            "Webhook server listening"
        );

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                    info!("Webhook server shutting down");
                })
                .await;
            if let Err(e) = &result {
                error!(error = %e, "Webhook server error");
            }
            result.map_err(ServerError::from)
        });

        Ok(ServerHandle {
            local_addr,
            shutdown: Some(shutdown_tx),
            task,
        })
    }
}

/// Handle to a server started with [`WebhookServer::spawn`].
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<ServerResult<()>>,
}

impl ServerHandle {
    /// The address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections and waits for in-flight requests.
    pub async fn shutdown(mut self) -> ServerResult<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.task
            .await
            .map_err(|e| ServerError::Join(e.to_string()))?
    }
}

// ============================================================================
// Endpoints
// ============================================================================

async fn events_handler(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    let envelope = match Envelope::parse(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Malformed event envelope");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    // Ignored envelope types carry nothing to act on and are not checked.
    if let Some(expected) = &state.verification_token
        && !matches!(envelope, Envelope::Other)
        && envelope.token() != Some(expected.as_str())
    {
        warn!(error = %VerifyError::TokenMismatch, "Rejected event envelope");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match envelope {
        Envelope::UrlVerification { challenge, .. } => {
            info!("Answering URL verification challenge");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/plain")],
                challenge,
            )
                .into_response()
        }
        Envelope::EventCallback {
            event, event_id, ..
        } => {
            let event = match decode_event(event) {
                Ok(InnerEvent::Known(event)) => event,
                Ok(InnerEvent::Unsupported(tag)) => {
                    debug!(event_type = %tag, "Ignoring unsupported event type");
                    return StatusCode::OK.into_response();
                }
                Err(e) => {
                    warn!(error = %e, "Malformed inner event");
                    return StatusCode::BAD_REQUEST.into_response();
                }
            };

            let kind = event.kind();
            debug!(%kind, event_id = ?event_id, "Received event");

            match tokio::time::timeout(state.request_timeout, state.router.dispatch_event(event))
                .await
            {
                Ok(Ok(())) => StatusCode::OK.into_response(),
                Ok(Err(e)) => {
                    error!(%kind, error = %e, "Event handler failed");
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
                Err(_) => {
                    error!(%kind, "Event dispatch timed out");
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            }
        }
        Envelope::Other => StatusCode::OK.into_response(),
    }
}

async fn commands_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(verifier) = &state.verifier
        && let Err(e) = verify_request(verifier, &headers, &body)
    {
        warn!(error = %e, "Rejected slash command");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let command: Command = match serde_urlencoded::from_bytes(&body) {
        Ok(command) => command,
        Err(e) => {
            warn!(error = %e, "Malformed slash command body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let name = command.command.clone();
    debug!(command = %name, user = %command.user_id, "Received slash command");

    let reply = match tokio::time::timeout(state.request_timeout, state.router.dispatch_command(command))
        .await
    {
        Ok(Ok(message)) => message,
        Ok(Err(e)) => {
            warn!(command = %name, error = %e, "Command handler failed");
            Message::text(format!("command handle failure: {e}"))
        }
        Err(_) => {
            error!(command = %name, "Command dispatch timed out");
            Message::text("command handle failure: timed out")
        }
    };

    (StatusCode::OK, Json(reply)).into_response()
}

fn verify_request(
    verifier: &SignatureVerifier,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), VerifyError> {
    let timestamp = header_str(headers, TIMESTAMP_HEADER)?;
    let signature = header_str(headers, SIGNATURE_HEADER)?;
    verifier.verify(timestamp, signature, body)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, VerifyError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or(VerifyError::MissingHeader(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use serde_json::{Value, json};
    use std::sync::Mutex;
    use std::time::{SystemTime, UNIX_EPOCH};
    use switchyard_core::{ApiResult, Client, EventKind};
    use switchyard_framework::{EventFilter, Next};
    use tower::ServiceExt;

    #[derive(Default)]
    struct NullClient;

    #[async_trait]
    impl Client for NullClient {
        async fn call_api(&self, _method: &str, _params: Value) -> ApiResult<Value> {
            Ok(json!({ "ok": true }))
        }
    }

    const SECRET: &str = "shhh";

    fn config() -> WebhookConfig {
        WebhookConfig {
            verification_token: Some("t0k".to_string()),
            signing_secret: Some(SECRET.to_string()),
            ..Default::default()
        }
    }

    fn app_with(router: Router) -> axum::Router {
        WebhookServer::new(config(), Arc::new(router)).app()
    }

    fn json_request(path: &str, body: Value) -> Request<Body> {
        Request::post(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn signed_command(body: &'static str) -> Request<Body> {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
            .to_string();
        let sig = SignatureVerifier::new(SECRET, Duration::from_secs(300))
            .sign(&ts, body.as_bytes())
            .unwrap();
        Request::post("/slack/commands")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(TIMESTAMP_HEADER, ts)
            .header(SIGNATURE_HEADER, sig)
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn message_callback(token: &str) -> Value {
        json!({
            "type": "event_callback",
            "token": token,
            "event": { "type": "message", "channel": "C1", "user": "U1", "text": "hi", "ts": "1.0" }
        })
    }

    #[tokio::test]
    async fn test_url_verification_echoes_challenge() {
        let app = app_with(Router::new(Arc::new(NullClient)));
        let response = app
            .oneshot(json_request(
                "/slack/events",
                json!({ "type": "url_verification", "token": "t0k", "challenge": "abc123" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(body_string(response).await, "abc123");
    }

    #[tokio::test]
    async fn test_wrong_token_is_unauthorized() {
        let app = app_with(Router::new(Arc::new(NullClient)));
        let response = app
            .oneshot(json_request("/slack/events", message_callback("nope")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_rate_limit_notice_is_acknowledged() {
        let app = app_with(Router::new(Arc::new(NullClient)));
        let response = app
            .oneshot(json_request(
                "/slack/events",
                json!({
                    "type": "app_rate_limited",
                    "token": "t0k",
                    "team_id": "T1",
                    "minute_rate_limited": 1518467820,
                    "api_app_id": "A1"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_envelope_is_bad_request() {
        let app = app_with(Router::new(Arc::new(NullClient)));
        let request = Request::post("/slack/events").body(Body::from("{")).unwrap();

        assert_eq!(app.oneshot(request).await.unwrap().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_event_is_dispatched() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let record = Arc::clone(&seen);
        let router = Router::new(Arc::new(NullClient)).with_event_handler(
            [EventFilter::kind(EventKind::Message)],
            move |event, _client, _next: Next| {
                record.lock().unwrap().push(event.kind());
                async { Ok(()) }
            },
        );

        let response = app_with(router)
            .oneshot(json_request("/slack/events", message_callback("t0k")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(*seen.lock().unwrap(), vec![EventKind::Message]);
    }

    #[tokio::test]
    async fn test_handler_error_is_server_error() {
        let router = Router::new(Arc::new(NullClient))
            .with_event_handler([], |_event, _client, _next| async { Err("nope".into()) });

        let response = app_with(router)
            .oneshot(json_request("/slack/events", message_callback("t0k")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_unsupported_event_is_acknowledged() {
        let router = Router::new(Arc::new(NullClient))
            .with_event_handler([], |_event, _client, _next| async { Err("unreachable".into()) });

        let response = app_with(router)
            .oneshot(json_request(
                "/slack/events",
                json!({
                    "type": "event_callback",
                    "token": "t0k",
                    "event": { "type": "reaction_added", "user": "U1" }
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_signed_command_round_trip() {
        let router = Router::new(Arc::new(NullClient)).with_command_handler(
            "/echo",
            |cmd: Command, _client| async move { Ok(Message::text(cmd.text).in_channel()) },
        );

        let response = app_with(router)
            .oneshot(signed_command("command=%2Fecho&text=hello+world&user_id=U1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(
            body,
            json!({ "text": "hello world", "response_type": "in_channel" })
        );
    }

    #[tokio::test]
    async fn test_unknown_command_reports_failure_message() {
        let response = app_with(Router::new(Arc::new(NullClient)))
            .oneshot(signed_command("command=%2Fmissing&text="))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(
            body["text"],
            "command handle failure: no handler for command `/missing`"
        );
    }

    #[tokio::test]
    async fn test_unsigned_command_is_unauthorized() {
        let request = Request::post("/slack/commands")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("command=%2Fecho"))
            .unwrap();

        let response = app_with(Router::new(Arc::new(NullClient)))
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_spawned_server_shuts_down() {
        let config = WebhookConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..Default::default()
        };
        let handle = WebhookServer::new(config, Arc::new(Router::new(Arc::new(NullClient))))
            .spawn()
            .await
            .unwrap();

        assert_ne!(handle.local_addr().port(), 0);
        handle.shutdown().await.unwrap();
    }
}
