//! Listener declarations for the event bus.
//!
//! A [`Listener`] pairs a handler with an [`EventSelector`] and a
//! [`Priority`]. The typed builder methods set both the selector and the
//! handler in one go, so a handler can never be bound to events it cannot
//! accept:
//!
//! ```rust,ignore
//! use chameleon_core::{Listener, Priority, UserChatEvent, Cancellable};
//!
//! // Exactly one concrete event type.
//! let censor = Listener::new()
//!     .name("censor")
//!     .priority(Priority::First)
//!     .on(|event: &mut UserChatEvent| event.set_message("***"));
//!
//! // Every event exposing the Cancellable capability.
//! let audit = Listener::new()
//!     .priority(Priority::Monitor)
//!     .on_cancellable(|event: &mut dyn Cancellable| {
//!         tracing::info!(cancelled = event.is_cancelled(), "observed");
//!     });
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::error::{BoxError, EventError, EventResult};
use crate::foundation::{Cancellable, Event, Priority};
use crate::handler::IntoHandlerResult;

/// A type-erased listener body.
pub type ErasedHandler = Arc<dyn Fn(&mut dyn Event) -> Result<(), BoxError> + Send + Sync>;

// ============================================================================
// EventSelector
// ============================================================================

/// Which events a listener wants to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSelector {
    /// Exactly one concrete event type.
    Exact {
        /// The concrete event type.
        type_id: TypeId,
        /// The Rust type name, for diagnostics.
        type_name: &'static str,
    },
    /// Every event exposing the [`Cancellable`] capability.
    Cancellable,
    /// Every event.
    All,
}

impl EventSelector {
    /// Selects exactly the event type `E`.
    pub fn exact<E: Event>() -> Self {
        Self::Exact {
            type_id: TypeId::of::<E>(),
            type_name: std::any::type_name::<E>(),
        }
    }

    /// Returns whether `event` should be delivered to listeners with this selector.
    pub fn accepts(&self, event: &dyn Event) -> bool {
        match self {
            Self::Exact { type_id, .. } => Any::type_id(event.as_any()) == *type_id,
            Self::Cancellable => event.as_cancellable().is_some(),
            Self::All => true,
        }
    }
}

impl fmt::Display for EventSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact { type_name, .. } => f.write_str(type_name),
            Self::Cancellable => f.write_str("<cancellable>"),
            Self::All => f.write_str("<all>"),
        }
    }
}

// ============================================================================
// Listener
// ============================================================================

/// Declarative description of a listener, consumed by
/// [`EventBus::register`](super::EventBus::register).
#[derive(Clone, Default)]
pub struct Listener {
    selector: Option<EventSelector>,
    handler: Option<ErasedHandler>,
    priority: Priority,
    name: Option<String>,
}

impl Listener {
    /// Creates an empty listener at the default priority.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a name for this listener (used in logs).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the dispatch priority.
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Binds a handler for exactly the event type `E`.
    pub fn on<E, F, R>(mut self, f: F) -> Self
    where
        E: Event,
        F: Fn(&mut E) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        let handler: ErasedHandler =
            Arc::new(move |event: &mut dyn Event| match event.downcast_mut::<E>() {
                Some(event) => f(event).into_handler_result(),
                None => Ok(()),
            });
        self.selector = Some(EventSelector::exact::<E>());
        self.handler = Some(handler);
        self
    }

    /// Binds a handler for every cancellable event.
    pub fn on_cancellable<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&mut dyn Cancellable) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        let handler: ErasedHandler =
            Arc::new(move |event: &mut dyn Event| match event.as_cancellable_mut() {
                Some(event) => f(event).into_handler_result(),
                None => Ok(()),
            });
        self.selector = Some(EventSelector::Cancellable);
        self.handler = Some(handler);
        self
    }

    /// Binds a handler for every event.
    pub fn on_any<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&mut dyn Event) -> R + Send + Sync + 'static,
        R: IntoHandlerResult,
    {
        let handler: ErasedHandler =
            Arc::new(move |event: &mut dyn Event| f(event).into_handler_result());
        self.selector = Some(EventSelector::All);
        self.handler = Some(handler);
        self
    }

    /// Sets the selector without a handler.
    ///
    /// Use together with [`erased`](Self::erased) when the handler is built
    /// elsewhere, e.g. from a registration table.
    pub fn select(mut self, selector: EventSelector) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Sets a pre-built erased handler.
    pub fn erased(mut self, handler: ErasedHandler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Returns the configured priority.
    pub fn get_priority(&self) -> Priority {
        self.priority
    }

    /// Returns the name of this listener, if set.
    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Validates the declaration and turns it into a binding.
    pub(crate) fn into_binding(self, id: u64) -> EventResult<Binding> {
        let selector = self
            .selector
            .ok_or(EventError::invalid_listener("missing event selector"))?;
        let handler = self
            .handler
            .ok_or(EventError::invalid_listener("missing handler"))?;

        Ok(Binding {
            id,
            selector,
            priority: self.priority,
            handler,
            name: self.name,
        })
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("selector", &self.selector)
            .field("priority", &self.priority)
            .field("has_handler", &self.handler.is_some())
            .field("name", &self.name)
            .finish()
    }
}

// ============================================================================
// Binding
// ============================================================================

/// Handle returned by registration, used to unregister the listener later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerHandle(pub(crate) u64);

impl ListenerHandle {
    /// Returns the registration sequence number behind this handle.
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// A registered listener. Immutable once created.
pub(crate) struct Binding {
    pub(crate) id: u64,
    pub(crate) selector: EventSelector,
    pub(crate) priority: Priority,
    pub(crate) handler: ErasedHandler,
    pub(crate) name: Option<String>,
}

impl Binding {
    pub(crate) fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }

    pub(crate) fn handle(&self) -> ListenerHandle {
        ListenerHandle(self.id)
    }
}
