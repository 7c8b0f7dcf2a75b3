//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{ChameleonConfig, CommandsConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &ChameleonConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    validate_commands_config(&config.commands)?;
    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output is \"file\"",
        ));
    }

    for target in logging.filters.keys() {
        if target.is_empty() || target.contains(char::is_whitespace) {
            return Err(ConfigError::validation(format!(
                "Invalid log filter target: {target:?}"
            )));
        }
    }

    Ok(())
}

/// Validates command settings.
fn validate_commands_config(commands: &CommandsConfig) -> ConfigResult<()> {
    for label in &commands.disabled {
        if label.is_empty() {
            return Err(ConfigError::validation(
                "Disabled command labels cannot be empty",
            ));
        }

        if label.contains(' ') {
            return Err(ConfigError::validation(format!(
                "Disabled command label cannot contain spaces: {label:?}"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ChameleonConfig::default()).is_ok());
    }

    #[test]
    fn test_file_output_requires_path() {
        let mut config = ChameleonConfig::default();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));

        config.logging.file_path = Some(PathBuf::from("logs/chameleon.log"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_filter_targets() {
        let mut config = ChameleonConfig::default();
        config
            .logging
            .filters
            .insert("chameleon_core".into(), LogLevel::Trace);
        assert!(validate_config(&config).is_ok());

        config
            .logging
            .filters
            .insert("bad target".into(), LogLevel::Debug);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_disabled_labels() {
        let mut config = ChameleonConfig::default();
        config.commands.disabled = vec!["example".into()];
        assert!(validate_config(&config).is_ok());

        config.commands.disabled = vec![String::new()];
        assert!(validate_config(&config).is_err());

        config.commands.disabled = vec!["two words".into()];
        assert!(validate_config(&config).is_err());
    }
}
