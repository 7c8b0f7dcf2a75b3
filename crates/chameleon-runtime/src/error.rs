//! Runtime error types.

use chameleon_core::CommandError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while running a plugin.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A command definition was rejected.
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// The plugin is already enabled.
    #[error("Plugin already enabled: {0}")]
    PluginAlreadyEnabled(String),

    /// A lifecycle hook of the plugin failed.
    #[error("Plugin '{plugin}' failed: {message}")]
    Plugin {
        /// The plugin name.
        plugin: String,
        /// What went wrong.
        message: String,
    },
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
