//! # Chameleon Core
//!
//! The platform-agnostic engine of the Chameleon plugin framework.
//!
//! This crate knows nothing about any particular game server or proxy. A
//! platform adapter translates native callbacks into the canonical types
//! defined here, hands them to the core, and maps the final state back onto
//! the platform.
//!
//! ## Building Blocks
//!
//! ### Foundation
//!
//! - **Events**: the [`Event`] contract with the [`Cancellable`] capability and
//!   the canonical events in [`events`]
//! - **Priorities**: dispatch tiers ([`Priority`])
//! - **Senders**: users, the console, and the polymorphic [`Sender`]
//! - **Platforms**: platform identity and command filters ([`PlatformTarget`])
//!
//! ### Event Bus
//!
//! - [`EventBus`] dispatches an event to every matching [`Listener`] in
//!   priority order, isolating listener faults
//!
//! ### Commands
//!
//! - [`Command`] and [`CommandBuilder`] describe a command with permission,
//!   conditions and sub-commands
//! - [`CommandRegistry`] routes invocations by label
//! - [`Context`] carries the sender, arguments and [`Application`] handle of
//!   one invocation
//!
//! ## Data Flow
//!
//! ```text
//! ┌────────────┐  event   ┌──────────┐ ──▶ Listener (First)
//! │  Platform  │────────▶ │ EventBus │ ──▶ Listener (Third)
//! │  adapter   │ ◀─────── │          │ ──▶ Listener (Monitor)
//! └────────────┘  final   └──────────┘
//!       │         state
//!       │ Context ┌─────────┐
//!       └───────▶ │ Command │ permission ─▶ conditions ─▶ sub-command | execute
//!                 └─────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use chameleon_core::prelude::*;
//!
//! let bus = EventBus::new();
//!
//! bus.subscribe(Priority::First, |event: &mut UserChatEvent| {
//!     if event.message().contains("badword") {
//!         event.set_cancelled(true)?;
//!     }
//!     Ok::<_, EventError>(())
//! });
//!
//! bus.subscribe(Priority::Monitor, |event: &mut UserChatEvent| {
//!     tracing::info!(cancelled = event.is_cancelled(), "chat observed");
//! });
//!
//! let event = bus.dispatch(UserChatEvent::new(user, "hello"));
//! ```

pub mod bus;
pub mod command;
pub mod context;
pub mod error;
pub mod events;
pub mod foundation;
pub mod handler;

#[cfg(test)]
pub(crate) mod testing;

// Re-export foundation types
pub use foundation::{
    AsAny, BoxedUser, CancelState, Cancellable, ChatUser, Event, Platform, PlatformKind,
    PlatformTarget, Priority, Sender, User,
};

// Re-export event bus types
pub use bus::{DispatchSummary, ErasedHandler, EventBus, EventSelector, Listener, ListenerHandle};

// Re-export command types
pub use command::{
    Command, CommandBuilder, CommandExecutor, CommandRegistry, Condition, Outcome, Pattern,
    SubCommand,
};
pub use context::{AppHandle, Application, Context};

// Re-export canonical events
pub use events::{
    ProxyUserSwitchEvent, Server, UserChatEvent, UserConnectEvent, UserDisconnectEvent,
};

pub use error::{BoxError, CommandError, CommandResult, EventError, EventResult};
pub use handler::{Fault, IntoHandlerResult};

/// Prelude for common imports.
pub mod prelude {
    pub use super::events::*;
    pub use super::foundation::*;
    pub use super::{
        AppHandle, Application, BoxError, Command, CommandExecutor, CommandRegistry, Condition,
        Context, EventBus, EventError, Listener, Outcome, SubCommand, cancellable_event,
    };
}
