//! Process lifecycle: configuration, logging, the client and the server.
//!
//! ```rust,ignore
//! use switchyard_runtime::SwitchyardRuntime;
//!
//! let runtime = SwitchyardRuntime::builder()
//!     .config_file("switchyard.toml")
//!     .profile("production")
//!     .build()?;
//!
//! let router = runtime
//!     .router()
//!     .with_command_handler("/ping", |_cmd, _client| async { Ok(Message::text("pong")) });
//!
//! runtime.run(router).await?;
//! ```

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio::signal;
use tracing::{debug, info};

use switchyard_core::BoxedClient;
use switchyard_framework::Router;
use switchyard_transport::{ApiClient, WebhookConfig, WebhookServer};

use crate::config::{ConfigLoader, SwitchyardConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging::{self, LoggingError};

/// A configured bot process.
///
/// Owns the validated configuration and the shared Web API client. Routers
/// created with [`router`](Self::router) hand that client to their handlers.
pub struct SwitchyardRuntime {
    config: SwitchyardConfig,
    client: BoxedClient,
}

impl SwitchyardRuntime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Validates `config` and builds the Web API client from it.
    ///
    /// Logging is left untouched; use the builder to have it initialised.
    pub fn from_config(config: SwitchyardConfig) -> RuntimeResult<Self> {
        validate_config(&config)?;
        let client = ApiClient::new((&config.api).into())?;
        Ok(Self::assemble(config, Arc::new(client)))
    }

    /// Validates `config` and uses `client` for all handlers.
    pub fn with_client(config: SwitchyardConfig, client: BoxedClient) -> RuntimeResult<Self> {
        validate_config(&config)?;
        Ok(Self::assemble(config, client))
    }

    fn assemble(config: SwitchyardConfig, client: BoxedClient) -> Self {
        info!(
            port = config.server.port,
            events_path = %config.server.events_path,
            commands_path = %config.server.commands_path,
            token_check = config.server.verification_token.is_some(),
            signature_check = config.server.signing_secret.is_some(),
            "Switchyard runtime created"
        );

        Self { config, client }
    }

    pub fn config(&self) -> &SwitchyardConfig {
        &self.config
    }

    pub fn client(&self) -> &BoxedClient {
        &self.client
    }

    /// Creates an empty router bound to this runtime's client.
    pub fn router(&self) -> Router {
        Router::new(Arc::clone(&self.client))
    }

    /// Creates the webhook server for `router` without starting it.
    pub fn server(&self, router: Router) -> WebhookServer {
        WebhookServer::new(WebhookConfig::from(&self.config.server), Arc::new(router))
    }

    /// Serves `router` until Ctrl+C (or SIGTERM on Unix), then shuts down
    /// gracefully.
    pub async fn run(self, router: Router) -> RuntimeResult<()> {
        let handle = self.server(router).spawn().await?;
        info!(addr = %handle.local_addr(), "Switchyard is running. Press Ctrl+C to stop.");

        let signalled = wait_for_shutdown().await;
        handle.shutdown().await?;
        signalled.map_err(RuntimeError::Signal)
    }

    /// Serves `router` until `shutdown` resolves.
    pub async fn run_until<F>(self, router: Router, shutdown: F) -> RuntimeResult<()>
    where
        F: Future<Output = ()>,
    {
        let handle = self.server(router).spawn().await?;
        debug!(addr = %handle.local_addr(), "Serving until shutdown future resolves");

        shutdown.await;
        handle.shutdown().await?;
        Ok(())
    }
}

async fn wait_for_shutdown() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C, shutting down");
    }

    Ok(())
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Loads configuration, initialises logging and creates a
/// [`SwitchyardRuntime`].
pub struct RuntimeBuilder {
    loader: ConfigLoader,
    client: Option<BoxedClient>,
    init_logging: bool,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            loader: ConfigLoader::new(),
            client: None,
            init_logging: true,
        }
    }

    /// Loads exactly this file instead of searching.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.loader = self.loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g. "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.loader = self.loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.loader = self.loader.search_path(path);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.loader = self.loader.without_env();
        self
    }

    /// Layers `config` below files and the environment.
    pub fn merge(mut self, config: SwitchyardConfig) -> Self {
        self.loader = self.loader.merge(config);
        self
    }

    /// Uses `client` instead of an [`ApiClient`] built from `[api]`.
    pub fn client(mut self, client: BoxedClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Leaves the global subscriber alone.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    pub fn build(self) -> RuntimeResult<SwitchyardRuntime> {
        let config = self.loader.load()?;

        if self.init_logging {
            match logging::init_from_config(&config.logging) {
                Ok(()) | Err(LoggingError::AlreadyInitialized(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        match self.client {
            Some(client) => SwitchyardRuntime::with_client(config, client),
            None => SwitchyardRuntime::from_config(config),
        }
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use std::path::PathBuf;

    fn empty_dir() -> PathBuf {
        std::env::temp_dir().join("switchyard-runtime-tests-no-config")
    }

    fn free_port() -> u16 {
        std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port()
    }

    fn local_config(port: u16) -> SwitchyardConfig {
        let mut config = SwitchyardConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = port;
        config.api.bot_token = Some("xoxb-test".to_string());
        config
    }

    #[test]
    fn test_build_from_merged_config() {
        let runtime = SwitchyardRuntime::builder()
            .search_path(empty_dir())
            .without_env()
            .without_logging()
            .merge(local_config(8123))
            .build()
            .unwrap();

        assert_eq!(runtime.config().server.port, 8123);
        assert!(runtime.router().chain().is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = local_config(8123);
        config.server.events_path = "events".to_string();

        let result = SwitchyardRuntime::from_config(config);
        assert!(matches!(
            result,
            Err(RuntimeError::Config(ConfigError::InvalidPath { .. }))
        ));
    }

    #[test]
    fn test_bad_base_url_is_rejected_before_client_is_built() {
        let mut config = local_config(8123);
        config.api.base_url = "ftp://example.com".to_string();

        let result = SwitchyardRuntime::from_config(config);
        assert!(matches!(
            result,
            Err(RuntimeError::Config(ConfigError::Validation { .. }))
        ));
    }

    #[test]
    fn test_router_shares_runtime_client() {
        let runtime = SwitchyardRuntime::from_config(local_config(8123)).unwrap();
        let router = runtime.router();

        assert!(Arc::ptr_eq(runtime.client(), router.client()));
    }

    #[tokio::test]
    async fn test_run_until_stops_on_shutdown() {
        let runtime = SwitchyardRuntime::from_config(local_config(free_port())).unwrap();
        let router = runtime.router();

        runtime.run_until(router, async {}).await.unwrap();
    }
}
