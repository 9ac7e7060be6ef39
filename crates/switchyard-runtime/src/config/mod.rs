//! Configuration for a Switchyard process.
//!
//! Settings are layered with figment (see [`loader`]) into a
//! [`SwitchyardConfig`] and checked by [`validate_config`] before use.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    ApiConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, ServerConfig,
    SpanEventConfig, SwitchyardConfig,
};
pub use validation::validate_config;
