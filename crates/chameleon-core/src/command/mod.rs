//! Command model and router.
//!
//! A [`Command`] is assembled once with [`CommandBuilder`] and then executed
//! any number of times, concurrently if the host wishes. Every invocation
//! walks the same stages:
//!
//! ```text
//! PermissionCheck -> ConditionCheck -> SubCommandResolution -> Execute
//! ```
//!
//! and stops at the first stage that short-circuits. The stage reached is
//! reported as an [`Outcome`].
//!
//! # Example
//!
//! ```rust,ignore
//! use chameleon_core::{Command, Condition, Context};
//!
//! let command = Command::builder("example|ex")
//!     .permission("example.command")
//!     .permission_message("You do not have permission to execute this command.")
//!     .condition(
//!         Condition::new(|ctx| !ctx.sender().is_console())
//!             .message("This command can only be used in-game."),
//!     )
//!     .sub_command("sub|test", |ctx: &Context| {
//!         let name = ctx.arg(0).unwrap_or(ctx.sender().name());
//!         ctx.sender().send_message(&format!("Hello, {name}!"));
//!     })
//!     .executor(|ctx: &Context| ctx.sender().send_message("Hello, world!"))
//!     .build()?;
//! ```

pub mod condition;
pub mod executor;
pub mod pattern;
pub mod registry;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use tracing::{Level, debug, error, span, trace};

use crate::context::Context;
use crate::error::{CommandError, CommandResult};
use crate::foundation::PlatformTarget;
use crate::handler::guarded;

pub use condition::Condition;
pub use executor::CommandExecutor;
pub use pattern::{Pattern, SubCommand};
pub use registry::CommandRegistry;

type TabCompleter = Arc<dyn Fn(&Context) -> Vec<String> + Send + Sync>;

// ============================================================================
// Outcome
// ============================================================================

/// The terminal stage a command invocation reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The sender lacks the command permission.
    PermissionDenied,
    /// The condition at `index` failed; later conditions were not evaluated.
    ConditionFailed {
        /// Position of the failing condition in declaration order.
        index: usize,
    },
    /// A sub-command matched, but the sender lacks its permission.
    SubCommandDenied {
        /// The matched pattern, as written.
        pattern: String,
    },
    /// A sub-command matched and ran.
    SubCommand {
        /// The matched pattern, as written.
        pattern: String,
    },
    /// The command's own executor ran.
    Executed,
    /// A condition, sub-command or executor failed; the fault was logged.
    Faulted,
}

impl Outcome {
    /// Returns `true` if a body (sub-command or executor) ran to completion.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::SubCommand { .. } | Self::Executed)
    }
}

// ============================================================================
// Command
// ============================================================================

/// An immutable command definition.
#[derive(Clone)]
pub struct Command {
    name: String,
    aliases: BTreeSet<String>,
    permission: Option<String>,
    permission_message: Option<String>,
    conditions: Vec<Condition>,
    platform: PlatformTarget,
    sub_commands: Vec<SubCommand>,
    executor: Arc<dyn CommandExecutor>,
    tab_completer: Option<TabCompleter>,
}

impl Command {
    /// Starts building a command from a `|`-separated list of labels. The
    /// first label is the name, the rest are aliases.
    pub fn builder(names: &str) -> CommandBuilder {
        CommandBuilder::new(names)
    }

    /// Returns the command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the aliases, excluding the name.
    pub fn aliases(&self) -> &BTreeSet<String> {
        &self.aliases
    }

    /// Returns the name followed by every alias.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Returns the required permission, if any.
    pub fn permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    /// Returns the permission denial message, if any.
    pub fn permission_message(&self) -> Option<&str> {
        self.permission_message.as_deref()
    }

    /// Returns the conditions in evaluation order.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Returns the platforms this command applies to.
    pub fn platform(&self) -> &PlatformTarget {
        &self.platform
    }

    /// Returns the sub-commands in resolution order.
    pub fn sub_commands(&self) -> &[SubCommand] {
        &self.sub_commands
    }

    /// Runs one invocation.
    ///
    /// Never panics and never propagates a fault from a condition or body;
    /// such faults are logged and reported as [`Outcome::Faulted`].
    pub fn execute(&self, ctx: &Context) -> Outcome {
        let span = span!(
            Level::DEBUG,
            "command",
            command = %self.name,
            sender = %ctx.sender().name(),
        );
        let _enter = span.enter();

        if let Some(permission) = &self.permission {
            if !ctx.sender().has_permission(permission) {
                debug!(permission = %permission, "Sender lacks command permission");
                if let Some(message) = &self.permission_message {
                    ctx.sender().send_message(message);
                }
                return Outcome::PermissionDenied;
            }
        }

        for (index, condition) in self.conditions.iter().enumerate() {
            let mut passed = false;
            if let Err(fault) = guarded(|| {
                passed = condition.test(ctx);
                Ok(())
            }) {
                error!(
                    condition = condition.get_name().unwrap_or("unnamed"),
                    index,
                    error = %fault,
                    "Command condition failed to evaluate"
                );
                return Outcome::Faulted;
            }

            if !passed {
                debug!(
                    condition = condition.get_name().unwrap_or("unnamed"),
                    index,
                    "Command condition not met"
                );
                if let Some(message) = condition.get_message() {
                    ctx.sender().send_message(message);
                }
                return Outcome::ConditionFailed { index };
            }
        }

        if let Some(sub) = self.resolve(ctx) {
            return self.execute_sub_command(sub, ctx);
        }

        trace!("Executing command body");
        match guarded(|| self.executor.execute(ctx)) {
            Ok(()) => Outcome::Executed,
            Err(fault) => {
                error!(error = %fault, "Command failed");
                Outcome::Faulted
            }
        }
    }

    /// Suggests completions for the current arguments.
    ///
    /// Returns nothing for senders lacking the command permission. While the
    /// first argument is being typed, sub-command labels starting with it are
    /// offered ahead of the command's own suggestions; once it names a
    /// sub-command, completion is delegated to that sub-command.
    pub fn tab_complete(&self, ctx: &Context) -> Vec<String> {
        if let Some(permission) = &self.permission {
            if !ctx.sender().has_permission(permission) {
                return Vec::new();
            }
        }

        if ctx.args().len() > 1 {
            if let Some(sub) = self.resolve(ctx) {
                if !Self::may_use(sub, ctx) {
                    return Vec::new();
                }
                let sub_ctx = ctx.shifted();
                return self.complete_guarded(|| sub.executor().tab_complete(&sub_ctx));
            }
        }

        let mut suggestions = Vec::new();
        if ctx.args().len() <= 1 {
            let prefix = ctx.arg(0).unwrap_or_default().to_lowercase();
            suggestions.extend(
                self.sub_commands
                    .iter()
                    .filter(|sub| Self::may_use(sub, ctx))
                    .flat_map(|sub| sub.pattern().alternatives())
                    .filter(|alternative| alternative.starts_with(&prefix))
                    .cloned(),
            );
        }

        suggestions.extend(self.complete_guarded(|| match &self.tab_completer {
            Some(completer) => completer(ctx),
            None => self.executor.tab_complete(ctx),
        }));
        suggestions
    }

    fn may_use(sub: &SubCommand, ctx: &Context) -> bool {
        sub.get_permission()
            .is_none_or(|permission| ctx.sender().has_permission(permission))
    }

    fn resolve(&self, ctx: &Context) -> Option<&SubCommand> {
        let token = ctx.arg(0)?.to_lowercase();
        self.sub_commands
            .iter()
            .find(|sub| sub.pattern().matches(&token))
    }

    fn execute_sub_command(&self, sub: &SubCommand, ctx: &Context) -> Outcome {
        let pattern = sub.pattern().as_str().to_string();

        if let Some(permission) = sub.get_permission() {
            if !ctx.sender().has_permission(permission) {
                debug!(
                    sub_command = %pattern,
                    permission,
                    "Sender lacks sub-command permission"
                );
                if let Some(message) = sub.get_permission_message() {
                    ctx.sender().send_message(message);
                }
                return Outcome::SubCommandDenied { pattern };
            }
        }

        trace!(sub_command = %pattern, "Executing sub-command");
        let sub_ctx = ctx.shifted();
        match guarded(|| sub.executor().execute(&sub_ctx)) {
            Ok(()) => Outcome::SubCommand { pattern },
            Err(fault) => {
                error!(sub_command = %pattern, error = %fault, "Sub-command failed");
                Outcome::Faulted
            }
        }
    }

    fn complete_guarded<F>(&self, complete: F) -> Vec<String>
    where
        F: FnOnce() -> Vec<String>,
    {
        let mut suggestions = Vec::new();
        if let Err(fault) = guarded(|| {
            suggestions = complete();
            Ok(())
        }) {
            error!(command = %self.name, error = %fault, "Tab completion failed");
        }
        suggestions
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("permission", &self.permission)
            .field("conditions", &self.conditions.len())
            .field("platform", &self.platform)
            .field("sub_commands", &self.sub_commands)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// CommandBuilder
// ============================================================================

/// Builder for [`Command`].
///
/// Configuration errors are collected while building and reported by
/// [`build`](Self::build), so a malformed command never reaches a registry.
#[must_use]
pub struct CommandBuilder {
    names: String,
    extra_aliases: Vec<String>,
    permission: Option<String>,
    permission_message: Option<String>,
    conditions: Vec<Condition>,
    platform: PlatformTarget,
    sub_commands: Vec<SubCommand>,
    executor: Option<Arc<dyn CommandExecutor>>,
    tab_completer: Option<TabCompleter>,
    error: Option<CommandError>,
}

impl CommandBuilder {
    /// Creates a builder from a `|`-separated list of labels.
    pub fn new(names: &str) -> Self {
        Self {
            names: names.to_string(),
            extra_aliases: Vec::new(),
            permission: None,
            permission_message: None,
            conditions: Vec::new(),
            platform: PlatformTarget::All,
            sub_commands: Vec::new(),
            executor: None,
            tab_completer: None,
            error: None,
        }
    }

    /// Adds an alias.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.extra_aliases.push(alias.into());
        self
    }

    /// Requires `permission`. An empty string means no permission.
    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        let permission = permission.into();
        self.permission = (!permission.is_empty()).then_some(permission);
        self
    }

    /// Sets the message sent when the permission is missing.
    pub fn permission_message(mut self, message: impl Into<String>) -> Self {
        self.permission_message = Some(message.into());
        self
    }

    /// Appends a condition.
    pub fn condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Replaces every condition.
    pub fn conditions(mut self, conditions: impl IntoIterator<Item = Condition>) -> Self {
        self.conditions = conditions.into_iter().collect();
        self
    }

    /// Restricts the command to some platforms.
    pub fn platform(mut self, platform: PlatformTarget) -> Self {
        self.platform = platform;
        self
    }

    /// Adds a sub-command. Sub-commands are resolved in the order added.
    pub fn sub_command(self, pattern: &str, executor: impl CommandExecutor + 'static) -> Self {
        match SubCommand::new(pattern, executor) {
            Ok(sub) => self.with_sub_command(sub),
            Err(err) => self.fail(err),
        }
    }

    /// Adds a pre-built sub-command, e.g. one carrying its own permission.
    pub fn with_sub_command(mut self, sub: SubCommand) -> Self {
        self.sub_commands.push(sub);
        self
    }

    /// Sets the command body.
    pub fn executor(mut self, executor: impl CommandExecutor + 'static) -> Self {
        self.executor = Some(Arc::new(executor));
        self
    }

    /// Overrides the executor's tab completion.
    pub fn tab_completer<F>(mut self, completer: F) -> Self
    where
        F: Fn(&Context) -> Vec<String> + Send + Sync + 'static,
    {
        self.tab_completer = Some(Arc::new(completer));
        self
    }

    fn fail(mut self, err: CommandError) -> Self {
        self.error.get_or_insert(err);
        self
    }

    /// Validates the configuration and builds the command.
    ///
    /// # Errors
    ///
    /// - [`CommandError::EmptyName`] if the name or any alias is blank
    /// - [`CommandError::InvalidPattern`] if a sub-command pattern was rejected
    /// - [`CommandError::MissingExecutor`] if no executor was set
    pub fn build(self) -> CommandResult<Command> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut labels = self
            .names
            .split('|')
            .map(str::to_string)
            .chain(self.extra_aliases);
        let name = labels.next().unwrap_or_default().trim().to_string();
        if name.is_empty() {
            return Err(CommandError::EmptyName);
        }

        let mut aliases = BTreeSet::new();
        for alias in labels {
            let alias = alias.trim();
            if alias.is_empty() {
                return Err(CommandError::EmptyName);
            }
            if alias != name {
                aliases.insert(alias.to_string());
            }
        }

        let executor = self
            .executor
            .ok_or_else(|| CommandError::MissingExecutor {
                command: name.clone(),
            })?;

        Ok(Command {
            name,
            aliases,
            permission: self.permission,
            permission_message: self.permission_message,
            conditions: self.conditions,
            platform: self.platform,
            sub_commands: self.sub_commands,
            executor,
            tab_completer: self.tab_completer,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;

    use super::*;
    use crate::error::BoxError;
    use crate::testing::{TestApp, console, player};

    fn ctx(sender: crate::Sender, args: &[&str]) -> Context {
        Context::new(sender, TestApp::handle(), args.iter().copied())
    }

    fn noop(_: &Context) {}

    #[test]
    fn test_builder_names_and_aliases() {
        let command = Command::builder("example|ex|EX|ex")
            .alias("example")
            .alias("demo")
            .executor(noop)
            .build()
            .unwrap();

        assert_eq!(command.name(), "example");
        assert_eq!(
            command.aliases().iter().map(String::as_str).collect::<Vec<_>>(),
            ["EX", "demo", "ex"]
        );
        assert_eq!(command.labels().count(), 4);
    }

    #[test]
    fn test_builder_validation() {
        assert_eq!(
            Command::builder("").executor(noop).build().err(),
            Some(CommandError::EmptyName)
        );
        assert_eq!(
            Command::builder("a||b").executor(noop).build().err(),
            Some(CommandError::EmptyName)
        );
        assert_eq!(
            Command::builder("example").build().err(),
            Some(CommandError::MissingExecutor {
                command: "example".into()
            })
        );
        assert!(matches!(
            Command::builder("example")
                .sub_command("sub||test", noop)
                .sub_command("also bad", noop)
                .executor(noop)
                .build(),
            Err(CommandError::InvalidPattern { pattern, .. }) if pattern == "sub||test"
        ));
    }

    #[test]
    fn test_empty_permission_is_no_permission() {
        let command = Command::builder("open")
            .permission("")
            .executor(noop)
            .build()
            .unwrap();
        let (steve, _) = player("Steve", &[]);

        assert_eq!(command.permission(), None);
        assert_eq!(command.execute(&ctx(steve, &[])), Outcome::Executed);
    }

    #[test]
    fn test_permission_gate() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (c1, c2) = (Arc::clone(&calls), Arc::clone(&calls));
        let command = Command::builder("example")
            .permission("example.command")
            .permission_message("denied")
            .condition(Condition::new(|_| panic!("conditions must not run")))
            .sub_command("sub|test", move |_: &Context| {
                c1.fetch_add(1, Ordering::SeqCst);
            })
            .executor(move |_: &Context| {
                c2.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .unwrap();

        let (steve, inbox) = player("Steve", &[]);
        let outcome = command.execute(&ctx(steve, &["test", "Alex"]));

        assert_eq!(outcome, Outcome::PermissionDenied);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(inbox.lock().as_slice(), ["denied"]);
    }

    #[test]
    fn test_permission_denied_without_message_is_silent() {
        let command = Command::builder("example")
            .permission("example.command")
            .executor(noop)
            .build()
            .unwrap();

        let (steve, inbox) = player("Steve", &[]);
        assert_eq!(command.execute(&ctx(steve, &[])), Outcome::PermissionDenied);
        assert!(inbox.lock().is_empty());
    }

    #[test]
    fn test_condition_short_circuit() {
        let second_evaluated = Arc::new(AtomicUsize::new(0));
        let evaluated = Arc::clone(&second_evaluated);
        let command = Command::builder("example")
            .condition(Condition::new(|_| false).message("first failed"))
            .condition(
                Condition::new(move |_| {
                    evaluated.fetch_add(1, Ordering::SeqCst);
                    false
                })
                .message("second failed"),
            )
            .executor(noop)
            .build()
            .unwrap();

        let (sender, inbox) = console();
        let outcome = command.execute(&ctx(sender, &[]));

        assert_eq!(outcome, Outcome::ConditionFailed { index: 0 });
        assert_eq!(inbox.lock().as_slice(), ["first failed"]);
        assert_eq!(second_evaluated.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_conditions_see_full_arguments() {
        let command = Command::builder("example")
            .condition(Condition::new(|ctx| ctx.args() == ["test", "Steve"]))
            .sub_command("test", noop)
            .executor(noop)
            .build()
            .unwrap();

        let (sender, _) = console();
        assert_eq!(
            command.execute(&ctx(sender, &["test", "Steve"])),
            Outcome::SubCommand {
                pattern: "test".into()
            }
        );
    }

    #[test]
    fn test_full_match_sub_command_resolution() {
        let sub_args = Arc::new(Mutex::new(None));
        let main_args = Arc::new(Mutex::new(None));
        let (s, m) = (Arc::clone(&sub_args), Arc::clone(&main_args));

        let command = Command::builder("example|ex")
            .sub_command("sub|test", move |ctx: &Context| {
                *s.lock() = Some(ctx.args().to_vec());
            })
            .executor(move |ctx: &Context| {
                *m.lock() = Some(ctx.args().to_vec());
            })
            .build()
            .unwrap();

        let (sender, _) = console();
        let outcome = command.execute(&ctx(sender.clone(), &["TEST", "Steve"]));
        assert_eq!(
            outcome,
            Outcome::SubCommand {
                pattern: "sub|test".into()
            }
        );
        assert_eq!(sub_args.lock().take(), Some(vec!["Steve".to_string()]));
        assert_eq!(main_args.lock().take(), None);

        let outcome = command.execute(&ctx(sender.clone(), &["testing"]));
        assert_eq!(outcome, Outcome::Executed);
        assert_eq!(sub_args.lock().take(), None);
        assert_eq!(main_args.lock().take(), Some(vec!["testing".to_string()]));

        let outcome = command.execute(&ctx(sender, &[]));
        assert_eq!(outcome, Outcome::Executed);
        assert_eq!(main_args.lock().take(), Some(Vec::new()));
    }

    #[test]
    fn test_first_matching_sub_command_wins() {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let (h1, h2) = (Arc::clone(&hits), Arc::clone(&hits));

        let command = Command::builder("example")
            .sub_command("a|shared", move |_: &Context| h1.lock().push("first"))
            .sub_command("shared|b", move |_: &Context| h2.lock().push("second"))
            .executor(noop)
            .build()
            .unwrap();

        let (sender, _) = console();
        command.execute(&ctx(sender, &["Shared"]));
        assert_eq!(hits.lock().as_slice(), ["first"]);
    }

    #[test]
    fn test_sub_command_permission() {
        let command = Command::builder("example")
            .with_sub_command(
                SubCommand::new("give", noop)
                    .unwrap()
                    .permission("example.give")
                    .permission_message("no give for you"),
            )
            .executor(|_: &Context| -> Result<(), BoxError> { Err("main must not run".into()) })
            .build()
            .unwrap();

        let (steve, inbox) = player("Steve", &[]);
        assert_eq!(
            command.execute(&ctx(steve, &["give"])),
            Outcome::SubCommandDenied {
                pattern: "give".into()
            }
        );
        assert_eq!(inbox.lock().as_slice(), ["no give for you"]);

        let (alex, _) = player("Alex", &["example.give"]);
        assert!(command.execute(&ctx(alex, &["give"])).is_success());
    }

    #[test]
    fn test_faults_do_not_escape() {
        let command = Command::builder("example")
            .sub_command("boom", |_: &Context| -> Result<(), BoxError> {
                panic!("sub-command exploded")
            })
            .executor(|_: &Context| -> Result<(), BoxError> { Err("executor failed".into()) })
            .build()
            .unwrap();

        let (sender, _) = console();
        assert_eq!(command.execute(&ctx(sender.clone(), &["boom"])), Outcome::Faulted);
        assert_eq!(command.execute(&ctx(sender.clone(), &[])), Outcome::Faulted);

        let guarded = Command::builder("guarded")
            .condition(Condition::new(|_| panic!("condition exploded")))
            .executor(noop)
            .build()
            .unwrap();
        assert_eq!(guarded.execute(&ctx(sender, &[])), Outcome::Faulted);
    }

    #[test]
    fn test_tab_complete() {
        let command = Command::builder("example")
            .permission("example.command")
            .sub_command("sub|test", noop)
            .sub_command("give", noop)
            .tab_completer(|_| vec!["tabcomplete".into()])
            .executor(noop)
            .build()
            .unwrap();

        let (sender, _) = console();
        assert_eq!(
            command.tab_complete(&ctx(sender.clone(), &[])),
            ["sub", "test", "give", "tabcomplete"]
        );
        assert_eq!(
            command.tab_complete(&ctx(sender.clone(), &["T"])),
            ["test", "tabcomplete"]
        );
        assert_eq!(
            command.tab_complete(&ctx(sender.clone(), &["x", "y"])),
            ["tabcomplete"]
        );
        assert!(command.tab_complete(&ctx(sender, &["test", "St"])).is_empty());

        let (steve, _) = player("Steve", &[]);
        assert!(command.tab_complete(&ctx(steve, &[])).is_empty());
    }

    #[test]
    fn test_tab_complete_hides_forbidden_sub_commands() {
        struct Players;

        impl CommandExecutor for Players {
            fn execute(&self, _ctx: &Context) -> Result<(), BoxError> {
                Ok(())
            }

            fn tab_complete(&self, _ctx: &Context) -> Vec<String> {
                vec!["Alex".into()]
            }
        }

        let command = Command::builder("example")
            .with_sub_command(
                SubCommand::new("give", Players)
                    .unwrap()
                    .permission("example.give"),
            )
            .sub_command("list", noop)
            .executor(noop)
            .build()
            .unwrap();

        let (steve, _) = player("Steve", &[]);
        assert_eq!(command.tab_complete(&ctx(steve.clone(), &[""])), ["list"]);
        assert!(command.tab_complete(&ctx(steve, &["give", ""])).is_empty());

        let (alex, _) = player("Alex", &["example.give"]);
        assert_eq!(
            command.tab_complete(&ctx(alex.clone(), &[""])),
            ["give", "list"]
        );
        assert_eq!(command.tab_complete(&ctx(alex, &["give", ""])), ["Alex"]);
    }

    #[test]
    fn test_tab_complete_defaults_to_empty() {
        let command = Command::builder("plain").executor(noop).build().unwrap();
        let (sender, _) = console();
        assert!(command.tab_complete(&ctx(sender, &["a"])).is_empty());
    }
}
