//! Handler return values and fault isolation.
//!
//! Listener and command bodies may return `()` or any `Result<(), E>` whose
//! error converts into [`BoxError`]. Whatever they return (or a panic they
//! raise) is funnelled through [`guarded`], which is the single place where
//! faults are caught before they could reach the host platform.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::error::BoxError;

// ============================================================================
// IntoHandlerResult
// ============================================================================

/// Types a listener or command body can return.
pub trait IntoHandlerResult {
    /// Converts the value into the uniform handler result.
    fn into_handler_result(self) -> Result<(), BoxError>;
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E: Into<BoxError>> IntoHandlerResult for Result<(), E> {
    fn into_handler_result(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

// ============================================================================
// Fault isolation
// ============================================================================

/// A failure raised by a listener or command body.
#[derive(Debug)]
pub enum Fault {
    /// The body returned an error.
    Error(BoxError),
    /// The body panicked.
    Panic(String),
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::Error(err) => write!(f, "{err}"),
            Fault::Panic(message) => write!(f, "panicked: {message}"),
        }
    }
}

/// Runs `body`, converting both returned errors and panics into a [`Fault`].
///
/// The body may leave whatever it borrowed mutably in a partially updated
/// state when it panics; callers only ever hand it the event or context of
/// the current call.
pub fn guarded<F>(body: F) -> Result<(), Fault>
where
    F: FnOnce() -> Result<(), BoxError>,
{
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(Fault::Error(err)),
        Err(payload) => Err(Fault::Panic(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
