//! Layered configuration loading with figment.
//!
//! Sources, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. Programmatic merges ([`ConfigLoader::merge`])
//! 3. Profile file (`switchyard.{profile}.toml`)
//! 4. Main file (`switchyard.toml` or `config.toml`)
//! 5. Environment variables (`SWITCHYARD_*`)
//!
//! Environment keys use `__` to descend into tables:
//!
//! - `SWITCHYARD_SERVER__PORT=8080` → `server.port = 8080`
//! - `SWITCHYARD_API__BOT_TOKEN=xoxb-...` → `api.bot_token = "xoxb-..."`
//!
//! TOML is enabled by the `toml-config` feature (default) and YAML by
//! `yaml-config` (`switchyard.yaml`, `switchyard.yml`, `config.yaml`).

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::SwitchyardConfig;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "SWITCHYARD_";

/// Variable that selects the profile.
pub const PROFILE_ENV: &str = "SWITCHYARD_PROFILE";

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Reads the profile from `SWITCHYARD_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_ENV)
            .map(|name| Self::parse(&name))
            .unwrap_or_default()
    }

    fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A config file format and the base names searched for it.
#[cfg(any(feature = "toml-config", feature = "yaml-config"))]
struct FileFormat {
    base_names: &'static [&'static str],
    merge: fn(Figment, &Path) -> Figment,
}

/// The enabled file formats, in search order.
#[cfg(any(feature = "toml-config", feature = "yaml-config"))]
fn formats() -> Vec<FileFormat> {
    let mut formats = Vec::new();
    #[cfg(feature = "toml-config")]
    formats.push(FileFormat {
        base_names: &["switchyard.toml", "config.toml"],
        merge: |figment, path| figment.merge(Toml::file(path)),
    });
    #[cfg(feature = "yaml-config")]
    formats.push(FileFormat {
        base_names: &["switchyard.yaml", "switchyard.yml", "config.yaml"],
        merge: |figment, path| figment.merge(Yaml::file(path)),
    });
    formats
}

/// Builds a [`SwitchyardConfig`] from defaults, files and the environment.
///
/// ```rust,ignore
/// let config = ConfigLoader::new()
///     .profile("production")
///     .file("deploy/switchyard.toml")
///     .load()?;
/// ```
pub struct ConfigLoader {
    figment: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    config_file: Option<PathBuf>,
    load_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            config_file: None,
            load_env: true,
        }
    }

    /// Sets the profile, overriding `SWITCHYARD_PROFILE`.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Adds a directory to search for config files.
    ///
    /// Without any search paths, the current directory and the user config
    /// directory (`~/.config/switchyard` on Linux) are searched.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Loads exactly this file instead of searching. It must exist.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Disables `SWITCHYARD_*` environment overrides.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Layers `config` above the defaults and below files and environment.
    pub fn merge(mut self, config: SwitchyardConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Loads the configuration.
    pub fn load(self) -> ConfigResult<SwitchyardConfig> {
        let profile = self.profile.clone();
        let config: SwitchyardConfig = self.build_figment()?.extract()?;

        debug!(
            %profile,
            level = %config.logging.level,
            port = config.server.port,
            "Configuration loaded"
        );
        Ok(config)
    }

    fn build_figment(mut self) -> ConfigResult<Figment> {
        let mut figment = Figment::from(Serialized::defaults(SwitchyardConfig::default()))
            .merge(std::mem::take(&mut self.figment));

        figment = match self.config_file.take() {
            Some(path) if path.exists() => {
                info!(path = %path.display(), "Loading configuration file");
                Self::merge_file(figment, &path)?
            }
            Some(path) => return Err(ConfigError::FileNotFound(path)),
            None => self.search_files(figment),
        };

        if self.load_env {
            trace!(prefix = ENV_PREFIX, "Merging environment overrides");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment)
    }

    fn merge_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
            _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
        }
    }

    fn resolved_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        std::env::current_dir()
            .ok()
            .into_iter()
            .chain(dirs::config_dir().map(|dir| dir.join("switchyard")))
            .collect()
    }

    /// Merges the first base file found per format, preceded by its profile
    /// variant when one sits next to it.
    #[cfg(any(feature = "toml-config", feature = "yaml-config"))]
    fn search_files(&self, mut figment: Figment) -> Figment {
        let search_paths = self.resolved_search_paths();
        let mut found = false;

        for format in formats() {
            let hit = search_paths.iter().find_map(|dir| {
                format
                    .base_names
                    .iter()
                    .map(|name| dir.join(name))
                    .find(|path| path.exists())
            });
            let Some(base_path) = hit else { continue };

            if let Some(profile_path) = self.profile_variant(&base_path)
                && profile_path.exists()
            {
                debug!(path = %profile_path.display(), "Loading profile configuration");
                figment = (format.merge)(figment, &profile_path);
            }

            info!(path = %base_path.display(), "Loading configuration file");
            figment = (format.merge)(figment, &base_path);
            found = true;
        }

        if !found {
            warn!("No configuration file found, using defaults");
        }
        figment
    }

    #[cfg(not(any(feature = "toml-config", feature = "yaml-config")))]
    fn search_files(&self, figment: Figment) -> Figment {
        figment
    }

    /// `dir/switchyard.toml` → `dir/switchyard.{profile}.toml`
    #[cfg(any(feature = "toml-config", feature = "yaml-config"))]
    fn profile_variant(&self, base: &Path) -> Option<PathBuf> {
        let stem = base.file_stem()?.to_str()?;
        let ext = base.extension()?.to_str()?;
        Some(base.with_file_name(format!("{stem}.{}.{ext}", self.profile)))
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<SwitchyardConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from `path`, with environment overrides.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<SwitchyardConfig> {
    ConfigLoader::new().file(path).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogLevel;
    use figment::Jail;

    #[test]
    fn test_defaults_without_sources() {
        Jail::expect_with(|jail| {
            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .without_env()
                .load()
                .unwrap();

            assert_eq!(config.logging.level, LogLevel::Info);
            assert_eq!(config.server.port, 3000);
            assert_eq!(config.server.events_path, "/slack/events");
            assert_eq!(config.api.base_url, "https://slack.com/api");
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "switchyard.toml",
                r#"
                [server]
                port = 8080
                signing_secret = "from-file"

                [logging]
                level = "debug"
                "#,
            )?;
            jail.set_env("SWITCHYARD_SERVER__PORT", "9090");
            jail.set_env("SWITCHYARD_API__BOT_TOKEN", "xoxb-env");

            let config = ConfigLoader::new()
                .search_path(jail.directory())
                .load()
                .unwrap();

            assert_eq!(config.server.port, 9090);
            assert_eq!(config.server.signing_secret.as_deref(), Some("from-file"));
            assert_eq!(config.logging.level, LogLevel::Debug);
            assert_eq!(config.api.bot_token.as_deref(), Some("xoxb-env"));
            Ok(())
        });
    }

    #[test]
    fn test_base_file_wins_over_profile_file() {
        Jail::expect_with(|jail| {
            jail.create_file("switchyard.toml", "[server]\nport = 4000\n")?;
            jail.create_file(
                "switchyard.production.toml",
                "[server]\nport = 5000\nevents_path = \"/prod/events\"\n",
            )?;

            let config = ConfigLoader::new()
                .profile("prod")
                .search_path(jail.directory())
                .without_env()
                .load()
                .unwrap();

            assert_eq!(config.server.port, 4000);
            assert_eq!(config.server.events_path, "/prod/events");
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        Jail::expect_with(|jail| {
            let result = ConfigLoader::new()
                .file(jail.directory().join("absent.toml"))
                .without_env()
                .load();

            assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
            Ok(())
        });
    }

    #[test]
    fn test_unsupported_extension() {
        Jail::expect_with(|jail| {
            jail.create_file("switchyard.ini", "port=1")?;
            let result = ConfigLoader::new()
                .file(jail.directory().join("switchyard.ini"))
                .without_env()
                .load();

            assert!(matches!(result, Err(ConfigError::UnsupportedFormat(ref ext)) if ext == "ini"));
            Ok(())
        });
    }

    #[test]
    fn test_profile_from_env() {
        Jail::expect_with(|jail| {
            jail.set_env(PROFILE_ENV, "Staging");
            assert_eq!(Profile::from_env(), Profile::Custom("staging".to_string()));
            Ok(())
        });
    }
}
