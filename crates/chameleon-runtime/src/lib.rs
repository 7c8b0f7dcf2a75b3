//! Chameleon Runtime - application layer for Chameleon plugins.
//!
//! This crate provides:
//! - The application handle (`Chameleon`) implementing the core `Application`
//!   trait, and the plugin lifecycle (`ChameleonPlugin`, `PluginState`)
//! - Configuration loading and validation (`ConfigLoader`)
//! - Logging configuration (`LoggingBuilder`)
//! - Warnings platform adapters emit for changes they cannot honor
//!
//! # Example
//!
//! ```rust,ignore
//! use chameleon_runtime::{Chameleon, ChameleonPlugin};
//! use chameleon_core::prelude::*;
//!
//! struct Greeter;
//!
//! impl ChameleonPlugin for Greeter {
//!     fn name(&self) -> &str {
//!         "greeter"
//!     }
//!
//!     fn on_enable(&self, chameleon: &Chameleon) -> Result<(), BoxError> {
//!         chameleon.event_bus().subscribe(Priority::Third, |event: &mut UserConnectEvent| {
//!             event.user().send_message("Welcome!");
//!         });
//!         Ok(())
//!     }
//! }
//!
//! let chameleon = Chameleon::builder(platform, Greeter).build()?;
//! chameleon.enable()?;
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod report;

// Re-exports
pub use app::{Chameleon, ChameleonBuilder, ChameleonPlugin, PluginState};
pub use config::{
    ChameleonConfig, CommandsConfig, ConfigError, ConfigLoader, ConfigResult, LoggingConfig,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use report::{
    reconcile_chat, report_chat_cancellation_failure, report_chat_modification_failure,
};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides all the commonly used logging macros:
/// - `trace!`, `debug!`, `info!`, `warn!`, `error!`
/// - `span`, `event`
/// - `instrument` attribute
/// - `Level` for span creation
pub mod prelude {
    pub use tracing::{Level, debug, error, event, info, instrument, span, trace, warn};
}
