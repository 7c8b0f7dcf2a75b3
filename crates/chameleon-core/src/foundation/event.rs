//! Event system for the Chameleon framework.
//!
//! This module provides the core event contract:
//!
//! - [`Event`] - Base trait for everything that can travel through the bus
//! - [`Cancellable`] - Capability for events carrying an advisory cancelled flag
//! - [`CancelState`] - Reusable cancelled/cancel-allowed pair backing most
//!   [`Cancellable`] implementations
//!
//! # Capabilities instead of type hierarchies
//!
//! An event advertises what it can do through the `as_*` accessors on
//! [`Event`]. The bus uses them to route "all cancellable events" listeners
//! without reflecting over concrete types:
//!
//! ```rust,ignore
//! use chameleon_core::{CancelState, cancellable_event};
//!
//! pub struct WorldSaveEvent {
//!     pub world: String,
//!     state: CancelState,
//! }
//!
//! cancellable_event!(WorldSaveEvent, "world_save", state);
//! ```

use std::any::Any;

use tracing::warn;

use crate::error::{EventError, EventResult};

// ============================================================================
// Downcasting Support
// ============================================================================

/// Object-safe access to `Any` for every event type.
///
/// Implemented automatically; event authors never implement it by hand.
pub trait AsAny: Any + Send + Sync {
    /// Returns a reference to self as `Any`.
    fn as_any(&self) -> &dyn Any;

    /// Returns a mutable reference to self as `Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ============================================================================
// Core Event Trait
// ============================================================================

/// The base trait for all events dispatched through the
/// [`EventBus`](crate::EventBus).
///
/// Events are created by a platform adapter per occurrence, handed to the bus
/// by mutable reference, and read back once dispatch returns. The bus never
/// retains them.
pub trait Event: AsAny {
    /// Returns the human-readable name of this event type.
    ///
    /// Defaults to the Rust type name.
    fn event_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Returns this event as a [`Cancellable`], if it has that capability.
    fn as_cancellable(&self) -> Option<&dyn Cancellable> {
        None
    }

    /// Mutable variant of [`as_cancellable`](Self::as_cancellable).
    fn as_cancellable_mut(&mut self) -> Option<&mut dyn Cancellable> {
        None
    }
}

impl<'a> dyn Event + 'a {
    /// Returns `true` if the concrete type of this event is `E`.
    pub fn is<E: Event>(&self) -> bool {
        self.as_any().is::<E>()
    }

    /// Attempts to downcast to a concrete event type.
    pub fn downcast_ref<E: Event>(&self) -> Option<&E> {
        self.as_any().downcast_ref()
    }

    /// Attempts to downcast to a concrete event type, mutably.
    pub fn downcast_mut<E: Event>(&mut self) -> Option<&mut E> {
        self.as_any_mut().downcast_mut()
    }

    /// Returns `true` if this event exposes the [`Cancellable`] capability.
    pub fn is_cancellable(&self) -> bool {
        self.as_cancellable().is_some()
    }
}

impl<'a> std::fmt::Debug for dyn Event + 'a {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("event_name", &self.event_name())
            .field(
                "cancelled",
                &self.as_cancellable().map(|c| c.is_cancelled()),
            )
            .finish()
    }
}

// ============================================================================
// Cancellation
// ============================================================================

/// Capability for events whose outcome a listener may veto.
///
/// Cancellation is advisory: setting the flag never stops the remaining
/// listeners from running. The adapter inspects the final state after
/// dispatch and maps it onto the platform.
pub trait Cancellable: Send + Sync {
    /// Returns whether the event is currently cancelled.
    fn is_cancelled(&self) -> bool;

    /// Returns whether the platform can honor a change of the cancelled flag.
    fn is_cancel_allowed(&self) -> bool;

    /// Sets the cancelled flag.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::CancellationDenied`] and leaves the flag untouched
    /// when the change cannot be honored. Setting the current value is always
    /// accepted.
    fn set_cancelled(&mut self, cancelled: bool) -> EventResult<()>;
}

/// Cancelled flag paired with the adapter's decision on whether it may change.
///
/// Adapters decide `allowed` once, when the event is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelState {
    cancelled: bool,
    allowed: bool,
}

impl Default for CancelState {
    fn default() -> Self {
        Self::new(false)
    }
}

impl CancelState {
    /// Creates a state whose cancelled flag may be changed freely.
    pub fn new(cancelled: bool) -> Self {
        Self {
            cancelled,
            allowed: true,
        }
    }

    /// Creates a state whose cancelled flag is frozen at `cancelled`.
    pub fn frozen(cancelled: bool) -> Self {
        Self {
            cancelled,
            allowed: false,
        }
    }

    /// Creates a state with an explicit `allowed` decision.
    pub fn with_allowed(cancelled: bool, allowed: bool) -> Self {
        Self { cancelled, allowed }
    }

    /// Returns whether the flag is set.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Returns whether the flag may change.
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Changes the flag on behalf of the event named `event`.
    ///
    /// A denied change is reported through `tracing` and returned as an error.
    pub fn set(&mut self, event: &'static str, cancelled: bool) -> EventResult<()> {
        if self.cancelled == cancelled {
            return Ok(());
        }

        if !self.allowed {
            warn!(
                event,
                requested = cancelled,
                "Cancellation cannot be honored in this context, leaving event unchanged"
            );
            return Err(EventError::CancellationDenied { event });
        }

        self.cancelled = cancelled;
        Ok(())
    }
}

/// Implements [`Event`] and [`Cancellable`] for a type holding a [`CancelState`].
///
/// ```rust,ignore
/// struct KickEvent { state: CancelState }
/// cancellable_event!(KickEvent, "kick", state);
/// ```
#[macro_export]
macro_rules! cancellable_event {
    ($ty:ty, $name:literal, $state:ident) => {
        impl $crate::Event for $ty {
            fn event_name(&self) -> &'static str {
                $name
            }

            fn as_cancellable(&self) -> Option<&dyn $crate::Cancellable> {
                Some(self)
            }

            fn as_cancellable_mut(&mut self) -> Option<&mut dyn $crate::Cancellable> {
                Some(self)
            }
        }

        impl $crate::Cancellable for $ty {
            fn is_cancelled(&self) -> bool {
                self.$state.is_cancelled()
            }

            fn is_cancel_allowed(&self) -> bool {
                self.$state.is_allowed()
            }

            fn set_cancelled(&mut self, cancelled: bool) -> $crate::EventResult<()> {
                self.$state.set($name, cancelled)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PlainEvent;

    impl Event for PlainEvent {}

    struct VetoEvent {
        state: CancelState,
    }

    cancellable_event!(VetoEvent, "veto", state);

    #[test]
    fn test_default_event_name_is_type_name() {
        assert!(PlainEvent.event_name().ends_with("PlainEvent"));
    }

    #[test]
    fn test_downcast_through_dyn_event() {
        let mut event = VetoEvent {
            state: CancelState::default(),
        };
        let dynamic: &mut dyn Event = &mut event;

        assert!(dynamic.is::<VetoEvent>());
        assert!(!dynamic.is::<PlainEvent>());
        assert!(dynamic.downcast_ref::<PlainEvent>().is_none());
        assert!(dynamic.downcast_mut::<VetoEvent>().is_some());
        assert!(dynamic.is_cancellable());
    }

    #[test]
    fn test_plain_event_is_not_cancellable() {
        let event: &dyn Event = &PlainEvent;
        assert!(!event.is_cancellable());
    }

    #[test]
    fn test_cancel_allowed() {
        let mut event = VetoEvent {
            state: CancelState::new(false),
        };

        assert!(event.set_cancelled(true).is_ok());
        assert!(event.is_cancelled());
        assert!(event.set_cancelled(false).is_ok());
        assert!(!event.is_cancelled());
    }

    #[test]
    fn test_cancel_denied_leaves_state_unchanged() {
        let mut event = VetoEvent {
            state: CancelState::frozen(false),
        };

        let result = event.set_cancelled(true);

        assert_eq!(
            result,
            Err(EventError::CancellationDenied { event: "veto" })
        );
        assert!(!event.is_cancelled());
        assert!(!event.is_cancel_allowed());
    }

    #[test]
    fn test_frozen_state_accepts_same_value() {
        let mut state = CancelState::frozen(true);
        assert!(state.set("veto", true).is_ok());
        assert!(state.set("veto", false).is_err());
        assert!(state.is_cancelled());
    }
}
