//! Switchyard Runtime: configuration, logging and process lifecycle.
//!
//! This crate provides:
//! - Layered configuration with figment ([`ConfigLoader`], [`SwitchyardConfig`])
//! - Global `tracing` subscriber setup ([`LoggingBuilder`], [`init_from_config`])
//! - [`SwitchyardRuntime`], which owns the Web API client and serves a
//!   [`Router`](switchyard_framework::Router) until shutdown
//!
//! ```ignore
//! use switchyard_runtime::SwitchyardRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = SwitchyardRuntime::builder().build()?;
//!     let router = runtime.router();
//!     runtime.run(router).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `toml-config` (default): read `switchyard.toml` / `config.toml`
//! - `yaml-config`: read `switchyard.yaml` / `config.yaml`
//! - `json-log`: enable `format = "json"` for log output

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{
    ApiConfig, ConfigError, ConfigLoader, ConfigResult, LogFormat, LogLevel, LogOutput,
    LogRotation, LoggingConfig, Profile, ServerConfig, SwitchyardConfig, load_config,
    load_config_from_file, validate_config,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, LoggingError, SpanEvents, init_from_config};
pub use runtime::{RuntimeBuilder, SwitchyardRuntime};

pub use tracing;
pub use tracing_subscriber;

/// Logging macros, so handler crates need not depend on `tracing` directly.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
