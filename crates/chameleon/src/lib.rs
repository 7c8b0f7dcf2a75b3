//! # Chameleon
//!
//! A cross-platform plugin framework for Minecraft servers and proxies.
//!
//! ## Overview
//!
//! A plugin is written once against the platform-agnostic types of this
//! crate. A thin platform adapter translates the host's native callbacks into
//! canonical events and command invocations, and maps the outcome back.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐ events  ┌──────────┐ ──▶ Listener (First .. Fifth)
//! │   Platform   │───────▶ │ EventBus │ ──▶ Listener (Monitor)
//! │   adapter    │         └──────────┘
//! │              │ command ┌─────────────────┐
//! │              │───────▶ │ CommandRegistry │ ──▶ Command ──▶ SubCommand
//! └──────────────┘         └─────────────────┘
//!         ▲
//!         │ load / enable / disable
//! ┌──────────────┐
//! │  Chameleon   │ ──▶ ChameleonPlugin hooks
//! └──────────────┘
//! ```
//!
//! - **Core**: events, listeners, the event bus, commands and their routing
//! - **Runtime**: the application handle, plugin lifecycle, configuration
//!   and logging
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chameleon::prelude::*;
//!
//! struct Example;
//!
//! impl ChameleonPlugin for Example {
//!     fn name(&self) -> &str {
//!         "example"
//!     }
//!
//!     fn on_enable(&self, chameleon: &Chameleon) -> Result<(), BoxError> {
//!         chameleon.register_command(
//!             Command::builder("hello")
//!                 .executor(|ctx: &Context| ctx.sender().send_message("Hello, world!"))
//!                 .build()?,
//!         )?;
//!         Ok(())
//!     }
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: read `chameleon.toml`
//! - `yaml-config`: read `chameleon.yaml`
//! - `json-log`: JSON log output

pub use chameleon_core as core;
pub use chameleon_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use chameleon::prelude::*;
/// ```
pub mod prelude {
    // Runtime - application handle and plugin lifecycle
    pub use chameleon_runtime::{Chameleon, ChameleonPlugin, PluginState};

    // Events, senders and platforms
    pub use chameleon_core::prelude::*;

    // Less common core types
    pub use chameleon_core::{ErasedHandler, EventSelector, ListenerHandle, PlatformTarget};
}
