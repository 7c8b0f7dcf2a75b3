//! Command bodies.

use crate::context::Context;
use crate::error::BoxError;
use crate::handler::IntoHandlerResult;

/// The body of a command or sub-command.
///
/// Implemented for every `Fn(&Context) -> R` where `R` is `()` or a
/// `Result<(), E>`, so most commands pass a closure. Implement it on a type
/// when the command also offers tab completion:
///
/// ```rust,ignore
/// struct Warp;
///
/// impl CommandExecutor for Warp {
///     fn execute(&self, ctx: &Context) -> Result<(), BoxError> {
///         ctx.sender().send_message("whoosh");
///         Ok(())
///     }
///
///     fn tab_complete(&self, _ctx: &Context) -> Vec<String> {
///         vec!["spawn".into(), "nether".into()]
///     }
/// }
/// ```
pub trait CommandExecutor: Send + Sync {
    /// Runs the command.
    fn execute(&self, ctx: &Context) -> Result<(), BoxError>;

    /// Suggests completions for the current arguments.
    ///
    /// The returned list is recomputed on every call. Defaults to no
    /// suggestions.
    fn tab_complete(&self, ctx: &Context) -> Vec<String> {
        let _ = ctx;
        Vec::new()
    }
}

impl<F, R> CommandExecutor for F
where
    F: Fn(&Context) -> R + Send + Sync,
    R: IntoHandlerResult,
{
    fn execute(&self, ctx: &Context) -> Result<(), BoxError> {
        self(ctx).into_handler_result()
    }
}
