//! Per-invocation command context and the application handle it carries.

use std::fmt;
use std::sync::Arc;

use crate::bus::EventBus;
use crate::command::CommandRegistry;
use crate::foundation::{Platform, Sender};

/// The running application, as seen by command and listener bodies.
///
/// Passed explicitly through every [`Context`] so commands never hold a
/// back-reference to the application that owns them.
pub trait Application: Send + Sync {
    /// Returns the application's event bus.
    fn event_bus(&self) -> &EventBus;

    /// Returns the platform the application runs on.
    fn platform(&self) -> &Platform;

    /// Returns the registered commands.
    fn commands(&self) -> &CommandRegistry;
}

/// Shared handle to the running application.
pub type AppHandle = Arc<dyn Application>;

/// Everything a command body needs to know about one invocation.
///
/// Built fresh by the platform adapter (or the command registry) for every
/// invocation and never mutated afterwards.
pub struct Context {
    sender: Sender,
    app: AppHandle,
    args: Vec<String>,
}

impl Context {
    /// Creates a context.
    pub fn new<I, S>(sender: Sender, app: AppHandle, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sender,
            app,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns who invoked the command.
    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    /// Returns the application handle.
    pub fn app(&self) -> &AppHandle {
        &self.app
    }

    /// Returns the raw arguments.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the argument at `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Builds the context handed to a resolved sub-command: same sender and
    /// application, with the first argument consumed.
    pub(crate) fn shifted(&self) -> Context {
        Context {
            sender: self.sender.clone(),
            app: Arc::clone(&self.app),
            args: self.args.iter().skip(1).cloned().collect(),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("sender", &self.sender)
            .field("platform", self.app.platform())
            .field("args", &self.args)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestApp, console};

    #[test]
    fn test_context_accessors() {
        let (sender, _inbox) = console();
        let ctx = Context::new(sender, TestApp::handle(), ["TEST", "Steve"]);

        assert_eq!(ctx.args(), ["TEST", "Steve"]);
        assert_eq!(ctx.arg(1), Some("Steve"));
        assert_eq!(ctx.arg(2), None);
        assert!(ctx.sender().is_console());
        assert_eq!(ctx.app().platform().id(), "test");
    }

    #[test]
    fn test_shifted_drops_first_argument() {
        let (sender, _inbox) = console();
        let ctx = Context::new(sender, TestApp::handle(), ["sub", "a", "b"]);

        let shifted = ctx.shifted();
        assert_eq!(shifted.args(), ["a", "b"]);
        assert_eq!(ctx.args().len(), 3);

        assert!(shifted.shifted().shifted().shifted().args().is_empty());
    }
}
