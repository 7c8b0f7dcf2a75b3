//! Unified error types for the Chameleon core.
//!
//! Two families live here:
//!
//! - [`EventError`] for listener registration and for state changes an event
//!   refuses to accept (cancellation or mutation the platform cannot honor).
//! - [`CommandError`] for malformed command definitions, detected when the
//!   command is built or registered and never at invocation time.
//!
//! Faults raised *inside* listener and command bodies are not modelled here;
//! they travel as [`BoxError`] and are swallowed at the bus/router seam.

use thiserror::Error;

/// Type-erased error returned by listener and command bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// =============================================================================
// Event Errors
// =============================================================================

/// Errors produced by the event model and the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// A listener was registered without a selector or a handler.
    #[error("invalid listener: {reason}")]
    InvalidListener {
        /// What was missing.
        reason: &'static str,
    },

    /// The event's cancellation state cannot be changed in the current context.
    #[error("cancellation of '{event}' cannot be honored by the platform")]
    CancellationDenied {
        /// Name of the event that refused the change.
        event: &'static str,
    },

    /// A payload field of the event is frozen in the current context.
    #[error("field '{field}' of '{event}' is immutable")]
    MutationDenied {
        /// Name of the event that refused the change.
        event: &'static str,
        /// The field that could not be changed.
        field: &'static str,
    },
}

impl EventError {
    /// Creates an invalid-listener error.
    pub fn invalid_listener(reason: &'static str) -> Self {
        Self::InvalidListener { reason }
    }
}

// =============================================================================
// Command Errors
// =============================================================================

/// Configuration errors for command definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The command did not resolve to a non-empty name.
    #[error("command name must not be empty")]
    EmptyName,

    /// A sub-command pattern could not be compiled.
    #[error("invalid sub-command pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The command has no execute body.
    #[error("command '{command}' has no executor")]
    MissingExecutor {
        /// The command name.
        command: String,
    },

    /// A name or alias is already taken by another registered command.
    #[error("command label '{label}' is already registered")]
    DuplicateLabel {
        /// The conflicting label.
        label: String,
    },
}

impl CommandError {
    /// Creates an invalid-pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for event operations.
pub type EventResult<T> = Result<T, EventError>;

/// Result type for command configuration.
pub type CommandResult<T> = Result<T, CommandError>;
