//! Configuration validation.

use super::error::{ConfigError, ConfigResult};
use super::schema::{ApiConfig, LogOutput, LoggingConfig, ServerConfig, SwitchyardConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &SwitchyardConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_server_config(&config.server)?;
    validate_api_config(&config.api)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.output is 'file' but logging.file_path is not set",
        ));
    }
    if logging.max_files == Some(0) {
        return Err(ConfigError::validation(
            "logging.max_files must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_server_config(server: &ServerConfig) -> ConfigResult<()> {
    if server.port == 0 {
        return Err(ConfigError::InvalidPort(server.port));
    }

    validate_path("server.events_path", &server.events_path)?;
    validate_path("server.commands_path", &server.commands_path)?;
    if server.events_path == server.commands_path {
        return Err(ConfigError::validation(format!(
            "server.events_path and server.commands_path are both '{}'",
            server.events_path
        )));
    }

    validate_secret("server.verification_token", server.verification_token.as_deref())?;
    validate_secret("server.signing_secret", server.signing_secret.as_deref())?;

    if server.request_timeout_secs == 0 {
        return Err(ConfigError::validation(
            "server.request_timeout_secs must be greater than 0",
        ));
    }

    Ok(())
}

fn validate_api_config(api: &ApiConfig) -> ConfigResult<()> {
    if !["http://", "https://"]
        .iter()
        .any(|scheme| api.base_url.starts_with(scheme))
    {
        return Err(ConfigError::validation(format!(
            "api.base_url must be an http(s) URL, got '{}'",
            api.base_url
        )));
    }

    validate_secret("api.bot_token", api.bot_token.as_deref())?;

    if api.timeout_secs == 0 {
        return Err(ConfigError::validation(
            "api.timeout_secs must be greater than 0",
        ));
    }

    Ok(())
}

fn validate_path(field: &'static str, path: &str) -> ConfigResult<()> {
    if !path.starts_with('/') {
        return Err(ConfigError::InvalidPath {
            field,
            path: path.to_string(),
        });
    }
    Ok(())
}

/// A secret may be absent, but not configured as blank.
fn validate_secret(field: &str, value: Option<&str>) -> ConfigResult<()> {
    match value {
        Some(secret) if secret.trim().is_empty() => {
            Err(ConfigError::validation(format!("{field} is set but empty")))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&SwitchyardConfig::default()).is_ok());
    }

    #[test]
    fn test_port_zero_rejected() {
        let mut config = SwitchyardConfig::default();
        config.server.port = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidPort(0))
        ));
    }

    #[test]
    fn test_relative_path_rejected() {
        let mut config = SwitchyardConfig::default();
        config.server.commands_path = "slack/commands".to_string();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidPath {
                field: "server.commands_path",
                ..
            })
        ));
    }

    #[test]
    fn test_shared_path_rejected() {
        let mut config = SwitchyardConfig::default();
        config.server.commands_path = config.server.events_path.clone();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_blank_secret_rejected() {
        let mut config = SwitchyardConfig::default();
        config.server.signing_secret = Some("  ".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_file_output_needs_path() {
        let mut config = SwitchyardConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("logs/bot.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
