//! Configuration schema definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ChameleonConfig {
    /// Raises the effective log level to `debug`.
    #[serde(default)]
    pub debug: bool,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Command settings.
    #[serde(default)]
    pub commands: CommandsConfig,
}

impl ChameleonConfig {
    /// Returns the logging settings with the `debug` switch applied.
    pub fn effective_logging(&self) -> LoggingConfig {
        let mut logging = self.logging.clone();
        if self.debug && logging.level > LogLevel::Debug {
            logging.level = LogLevel::Debug;
        }
        logging
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity, most verbose first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the lowercase name used in filter directives.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to the `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    #[cfg(feature = "json-log")]
    Json,
}

/// Where log lines are written.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Global log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Output destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Log file, required when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Include thread ids in log lines.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line in log lines.
    #[serde(default)]
    pub file_location: bool,

    /// Per-target levels, e.g. `chameleon_core = "trace"`.
    #[serde(default)]
    pub filters: BTreeMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            file_path: None,
            thread_ids: false,
            file_location: false,
            filters: BTreeMap::new(),
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

/// Command settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CommandsConfig {
    /// Labels of commands the host refuses to register (case-insensitive).
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl CommandsConfig {
    /// Returns whether `label` is disabled.
    pub fn is_disabled(&self, label: &str) -> bool {
        self.disabled
            .iter()
            .any(|disabled| disabled.eq_ignore_ascii_case(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_raises_level() {
        let mut config = ChameleonConfig::default();
        assert_eq!(config.effective_logging().level, LogLevel::Info);

        config.debug = true;
        assert_eq!(config.effective_logging().level, LogLevel::Debug);

        config.logging.level = LogLevel::Trace;
        assert_eq!(config.effective_logging().level, LogLevel::Trace);
    }

    #[test]
    fn test_disabled_labels_ignore_case() {
        let commands = CommandsConfig {
            disabled: vec!["Example".into()],
        };
        assert!(commands.is_disabled("example"));
        assert!(!commands.is_disabled("ex"));
    }

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Warn > LogLevel::Info);
        assert_eq!(LogLevel::Warn.to_string(), "warn");
    }
}
