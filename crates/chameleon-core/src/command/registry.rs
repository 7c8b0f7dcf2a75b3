//! Command registry.
//!
//! Maps every label (name or alias, case-insensitive) to its command and
//! routes raw invocations from platform adapters.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::command::{Command, Outcome};
use crate::context::{AppHandle, Context};
use crate::error::{CommandError, CommandResult};
use crate::foundation::{Platform, Sender};

/// The set of commands registered on one platform.
pub struct CommandRegistry {
    platform: Platform,
    commands: RwLock<HashMap<String, Arc<Command>>>,
}

impl CommandRegistry {
    /// Creates an empty registry for `platform`.
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            commands: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a command under its name and every alias.
    ///
    /// Returns `Ok(false)` without registering anything when the command's
    /// platform target excludes the running platform.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::DuplicateLabel`] if any label is already taken.
    /// Nothing is registered in that case.
    pub fn register(&self, command: Command) -> CommandResult<bool> {
        if !command.platform().matches(&self.platform) {
            debug!(
                command = %command.name(),
                platform = %self.platform.id(),
                "Command does not target this platform, skipping"
            );
            return Ok(false);
        }

        let mut commands = self.commands.write();
        let labels: Vec<String> = command.labels().map(str::to_lowercase).collect();
        if let Some(taken) = labels.iter().find(|label| commands.contains_key(*label)) {
            return Err(CommandError::DuplicateLabel {
                label: taken.clone(),
            });
        }

        debug!(
            command = %command.name(),
            aliases = ?command.aliases(),
            "Registered command"
        );

        let command = Arc::new(command);
        for label in labels {
            commands.insert(label, Arc::clone(&command));
        }
        Ok(true)
    }

    /// Removes the command owning `label`, along with all of its labels.
    ///
    /// Returns the removed command, if any.
    pub fn unregister(&self, label: &str) -> Option<Arc<Command>> {
        let mut commands = self.commands.write();
        let command = commands.get(&label.to_lowercase()).cloned()?;
        commands.retain(|_, c| !Arc::ptr_eq(c, &command));

        debug!(command = %command.name(), "Unregistered command");
        Some(command)
    }

    /// Looks up a command by name or alias, ignoring case.
    pub fn get(&self, label: &str) -> Option<Arc<Command>> {
        self.commands.read().get(&label.to_lowercase()).cloned()
    }

    /// Returns the number of registered commands (not labels).
    pub fn len(&self) -> usize {
        self.commands
            .read()
            .iter()
            .filter(|(label, command)| **label == command.name().to_lowercase())
            .count()
    }

    /// Returns `true` if no command is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }

    /// Removes every command.
    pub fn clear(&self) {
        self.commands.write().clear();
        debug!(platform = %self.platform.id(), "Cleared command registry");
    }

    /// Returns the names of all registered commands, sorted.
    pub fn names(&self) -> Vec<String> {
        let commands = self.commands.read();
        let mut names: Vec<String> = commands
            .values()
            .map(|command| command.name().to_string())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Executes the command registered under `label`.
    ///
    /// Returns `None` if no such command exists.
    pub fn dispatch<I, S>(
        &self,
        app: AppHandle,
        sender: Sender,
        label: &str,
        args: I,
    ) -> Option<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let Some(command) = self.get(label) else {
            warn!(label, sender = %sender.name(), "Unknown command");
            return None;
        };

        let ctx = Context::new(sender, app, args);
        Some(command.execute(&ctx))
    }

    /// Collects tab completions for the command registered under `label`.
    pub fn tab_complete<I, S>(
        &self,
        app: AppHandle,
        sender: Sender,
        label: &str,
        args: I,
    ) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.get(label) {
            Some(command) => command.tab_complete(&Context::new(sender, app, args)),
            None => Vec::new(),
        }
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("platform", &self.platform.id())
            .field("commands", &self.names())
            .finish()
    }
}
