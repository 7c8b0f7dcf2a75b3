//! The application handle and plugin lifecycle.
//!
//! A platform adapter creates one [`Chameleon`] per plugin, forwards the
//! platform's load/enable/disable callbacks to it, and routes native events
//! and commands through its event bus and command registry.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use chameleon_runtime::{Chameleon, ChameleonPlugin};
//!
//! let chameleon = Chameleon::builder(platform, MyPlugin)
//!     .config_file("plugins/my-plugin/chameleon.toml")
//!     .build()?;
//!
//! chameleon.enable()?;
//! chameleon.dispatch_command(sender, "example", ["sub", "Steve"]);
//! chameleon.disable();
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use chameleon_core::handler::guarded;
use chameleon_core::{
    AppHandle, Application, BoxError, Command, CommandRegistry, Event, EventBus, Outcome,
    Platform, Sender,
};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, span, warn};

use crate::config::{ChameleonConfig, ConfigLoader};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

// =============================================================================
// Plugin
// =============================================================================

/// A plugin driven by [`Chameleon`].
///
/// Hooks receive the application handle so they can subscribe listeners and
/// register commands. Errors and panics raised by a hook are caught and
/// surfaced as [`RuntimeError::Plugin`].
pub trait ChameleonPlugin: Send + Sync {
    /// Returns the plugin name.
    fn name(&self) -> &str;

    /// Called once, before the first enable.
    fn on_load(&self, _chameleon: &Chameleon) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called when the platform enables the plugin.
    fn on_enable(&self, chameleon: &Chameleon) -> Result<(), BoxError>;

    /// Called when the platform disables the plugin.
    fn on_disable(&self, _chameleon: &Chameleon) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Lifecycle state of the plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    /// Created, `on_load` not run yet.
    Constructed,
    /// `on_load` succeeded.
    Loaded,
    /// `on_enable` succeeded; listeners and commands are live.
    Enabled,
    /// Disabled after having been enabled.
    Disabled,
}

// =============================================================================
// Chameleon
// =============================================================================

struct Inner {
    platform: Platform,
    bus: EventBus,
    commands: CommandRegistry,
    config: ChameleonConfig,
    plugin: Arc<dyn ChameleonPlugin>,
    state: RwLock<PluginState>,
    /// Serializes lifecycle transitions; hooks run while it is held.
    lifecycle: Mutex<()>,
}

/// Handle to one running plugin: its event bus, commands, config and lifecycle.
///
/// Cloning is cheap and every clone refers to the same application.
#[derive(Clone)]
pub struct Chameleon {
    inner: Arc<Inner>,
}

impl Chameleon {
    /// Creates an application for `plugin` on `platform`.
    ///
    /// Logging is left untouched; use [`Chameleon::builder`] to load the
    /// configuration from disk and install a subscriber.
    pub fn new(
        platform: Platform,
        plugin: impl ChameleonPlugin + 'static,
        config: ChameleonConfig,
    ) -> Self {
        Self::from_parts(platform, Arc::new(plugin), config)
    }

    fn from_parts(
        platform: Platform,
        plugin: Arc<dyn ChameleonPlugin>,
        config: ChameleonConfig,
    ) -> Self {
        debug!(
            plugin = plugin.name(),
            platform = %platform.id(),
            "Creating application"
        );

        Self {
            inner: Arc::new(Inner {
                commands: CommandRegistry::new(platform.clone()),
                platform,
                bus: EventBus::new(),
                config,
                plugin,
                state: RwLock::new(PluginState::Constructed),
                lifecycle: Mutex::new(()),
            }),
        }
    }

    /// Creates a builder that loads the configuration and sets up logging.
    pub fn builder(
        platform: Platform,
        plugin: impl ChameleonPlugin + 'static,
    ) -> ChameleonBuilder {
        ChameleonBuilder::new(platform, Arc::new(plugin))
    }

    /// Returns the plugin name.
    pub fn plugin_name(&self) -> &str {
        self.inner.plugin.name()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ChameleonConfig {
        &self.inner.config
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> PluginState {
        *self.inner.state.read()
    }

    /// Returns a shared handle for command contexts.
    pub fn app_handle(&self) -> AppHandle {
        Arc::new(self.clone())
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Runs `on_load` unless it already succeeded.
    pub fn load(&self) -> RuntimeResult<()> {
        let _guard = self.inner.lifecycle.lock();
        self.load_locked()
    }

    fn load_locked(&self) -> RuntimeResult<()> {
        if self.state() != PluginState::Constructed {
            return Ok(());
        }

        self.run_hook("load", |plugin| plugin.on_load(self))?;
        *self.inner.state.write() = PluginState::Loaded;
        info!(plugin = self.plugin_name(), "Plugin loaded");
        Ok(())
    }

    /// Loads the plugin if needed, then runs `on_enable`.
    ///
    /// If `on_enable` fails, every listener and command it registered is
    /// removed again and the plugin stays loaded.
    pub fn enable(&self) -> RuntimeResult<()> {
        let _guard = self.inner.lifecycle.lock();

        if self.state() == PluginState::Enabled {
            return Err(RuntimeError::PluginAlreadyEnabled(
                self.plugin_name().to_string(),
            ));
        }
        self.load_locked()?;

        if let Err(err) = self.run_hook("enable", |plugin| plugin.on_enable(self)) {
            self.reset();
            return Err(err);
        }

        *self.inner.state.write() = PluginState::Enabled;
        info!(
            plugin = self.plugin_name(),
            platform = %self.inner.platform.id(),
            listeners = self.inner.bus.listener_count(),
            commands = self.inner.commands.len(),
            "Plugin enabled"
        );
        Ok(())
    }

    /// Runs `on_disable` and drops every listener and command.
    ///
    /// Does nothing unless the plugin is enabled. A failing `on_disable` is
    /// logged; the plugin is disabled regardless.
    pub fn disable(&self) {
        let _guard = self.inner.lifecycle.lock();

        if self.state() != PluginState::Enabled {
            debug!(plugin = self.plugin_name(), "Plugin not enabled, nothing to disable");
            return;
        }

        if let Err(err) = self.run_hook("disable", |plugin| plugin.on_disable(self)) {
            warn!(plugin = self.plugin_name(), error = %err, "Continuing shutdown");
        }

        self.reset();
        *self.inner.state.write() = PluginState::Disabled;
        info!(plugin = self.plugin_name(), "Plugin disabled");
    }

    fn reset(&self) {
        self.inner.bus.clear();
        self.inner.commands.clear();
    }

    fn run_hook<F>(&self, hook: &'static str, f: F) -> RuntimeResult<()>
    where
        F: FnOnce(&dyn ChameleonPlugin) -> Result<(), BoxError>,
    {
        let plugin = Arc::clone(&self.inner.plugin);
        let span = span!(tracing::Level::DEBUG, "lifecycle", plugin = plugin.name(), hook);
        let _enter = span.enter();

        guarded(|| f(plugin.as_ref())).map_err(|fault| {
            error!(error = %fault, "Lifecycle hook failed");
            RuntimeError::Plugin {
                plugin: plugin.name().to_string(),
                message: fault.to_string(),
            }
        })
    }

    // -------------------------------------------------------------------------
    // Commands and events
    // -------------------------------------------------------------------------

    /// Registers a command unless one of its labels is disabled in the
    /// configuration.
    ///
    /// Returns `Ok(false)` when the command was skipped, either because it is
    /// disabled or because it does not target the running platform.
    pub fn register_command(&self, command: Command) -> RuntimeResult<bool> {
        let commands = &self.inner.config.commands;
        if let Some(label) = command.labels().find(|label| commands.is_disabled(label)) {
            info!(
                command = %command.name(),
                label,
                "Command disabled by configuration, skipping"
            );
            return Ok(false);
        }

        Ok(self.inner.commands.register(command)?)
    }

    /// Executes the command registered under `label` on behalf of `sender`.
    pub fn dispatch_command<I, S>(&self, sender: Sender, label: &str, args: I) -> Option<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner
            .commands
            .dispatch(self.app_handle(), sender, label, args)
    }

    /// Collects tab completions for the command registered under `label`.
    pub fn tab_complete<I, S>(&self, sender: Sender, label: &str, args: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner
            .commands
            .tab_complete(self.app_handle(), sender, label, args)
    }

    /// Dispatches `event` on the event bus and returns it in its final state.
    pub fn dispatch<E: Event>(&self, event: E) -> E {
        self.inner.bus.dispatch(event)
    }
}

impl Application for Chameleon {
    fn event_bus(&self) -> &EventBus {
        &self.inner.bus
    }

    fn platform(&self) -> &Platform {
        &self.inner.platform
    }

    fn commands(&self) -> &CommandRegistry {
        &self.inner.commands
    }
}

impl fmt::Debug for Chameleon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chameleon")
            .field("plugin", &self.plugin_name())
            .field("platform", &self.inner.platform.id())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// ChameleonBuilder
// =============================================================================

/// Builder for a [`Chameleon`] whose configuration comes from files and the
/// environment.
///
/// # Example
///
/// ```rust,ignore
/// let chameleon = Chameleon::builder(platform, MyPlugin)
///     .search_path("plugins/my-plugin")
///     .build()?;
/// ```
pub struct ChameleonBuilder {
    platform: Platform,
    plugin: Arc<dyn ChameleonPlugin>,
    config_loader: ConfigLoader,
    init_logging: bool,
}

impl ChameleonBuilder {
    fn new(platform: Platform, plugin: Arc<dyn ChameleonPlugin>) -> Self {
        Self {
            platform,
            plugin,
            config_loader: ConfigLoader::new(),
            init_logging: true,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges additional configuration programmatically.
    pub fn merge(mut self, config: ChameleonConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Leaves the global `tracing` subscriber to the host.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    /// Loads the configuration, sets up logging and creates the application.
    pub fn build(self) -> RuntimeResult<Chameleon> {
        let config = self.config_loader.load()?;
        if self.init_logging {
            logging::init_from_config(&config);
        }

        info!(
            plugin = self.plugin.name(),
            log_level = %config.effective_logging().level,
            disabled_commands = config.commands.disabled.len(),
            "Application initialized from configuration"
        );

        Ok(Chameleon::from_parts(self.platform, self.plugin, config))
    }
}

// =============================================================================
// Tests
// =============================================================================
