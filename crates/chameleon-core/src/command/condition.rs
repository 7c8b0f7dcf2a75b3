//! Command conditions.

use std::fmt;
use std::sync::Arc;

use crate::context::Context;

type Predicate = Arc<dyn Fn(&Context) -> bool + Send + Sync>;

/// A predicate gating command execution, with an optional message sent to the
/// sender when it fails.
///
/// ```rust,ignore
/// let in_game = Condition::new(|ctx| !ctx.sender().is_console())
///     .name("in_game")
///     .message("This command can only be used in-game.");
/// ```
#[derive(Clone)]
pub struct Condition {
    predicate: Predicate,
    message: Option<String>,
    name: Option<String>,
}

impl Condition {
    /// Creates a condition without a failure message.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&Context) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            message: None,
            name: None,
        }
    }

    /// Sets the message sent when the condition fails.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets a name for this condition (used in logs).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Evaluates the predicate.
    pub fn test(&self, ctx: &Context) -> bool {
        (self.predicate)(ctx)
    }

    /// Returns the failure message, if any.
    pub fn get_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the name, if any.
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("name", &self.name)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}
