//! Configuration for the Chameleon runtime.
//!
//! Settings are layered with figment (defaults, a `chameleon.toml` file,
//! `CHAMELEON_*` environment variables, programmatic overrides) and checked
//! by [`validate_config`] before use.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, load_config, load_config_from_file};
pub use schema::{
    ChameleonConfig, CommandsConfig, LogFormat, LogLevel, LogOutput, LoggingConfig,
};
pub use validation::validate_config;
