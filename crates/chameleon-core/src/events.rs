//! Canonical platform-agnostic events.
//!
//! Platform adapters build these from native callbacks, dispatch them, and map
//! the final state back onto the platform:
//!
//! | Event                   | Cancellable | Mutable payload |
//! |-------------------------|-------------|-----------------|
//! | [`UserConnectEvent`]    | yes         | cancel reason   |
//! | [`UserChatEvent`]       | yes         | message         |
//! | [`UserDisconnectEvent`] | no          | -               |
//! | [`ProxyUserSwitchEvent`]| no          | -               |
//!
//! Whether a cancellation or a message change can still be honored is decided
//! by the adapter when it constructs the event.

use std::net::SocketAddr;

use tracing::warn;

use crate::cancellable_event;
use crate::error::{EventError, EventResult};
use crate::foundation::{BoxedUser, CancelState, Event};

/// Reason shown to a user whose connection was cancelled without an explicit one.
pub const DEFAULT_CANCEL_REASON: &str = "Disconnected";

// ============================================================================
// UserConnectEvent
// ============================================================================

/// Dispatched when a user finishes connecting to the platform.
///
/// Cancelling it disconnects the user with [`cancel_reason`](Self::cancel_reason).
pub struct UserConnectEvent {
    user: BoxedUser,
    cancel_reason: String,
    state: CancelState,
}

impl UserConnectEvent {
    /// Creates a connect event whose cancellation can be honored.
    pub fn new(user: BoxedUser, cancelled: bool) -> Self {
        Self::with_state(user, CancelState::new(cancelled))
    }

    /// Creates a connect event with an explicit cancellation state.
    pub fn with_state(user: BoxedUser, state: CancelState) -> Self {
        Self {
            user,
            cancel_reason: DEFAULT_CANCEL_REASON.to_string(),
            state,
        }
    }

    /// Returns the connecting user.
    pub fn user(&self) -> &BoxedUser {
        &self.user
    }

    /// Returns the reason shown to the user if the event ends up cancelled.
    pub fn cancel_reason(&self) -> &str {
        &self.cancel_reason
    }

    /// Sets the reason shown to the user if the event ends up cancelled.
    pub fn set_cancel_reason(&mut self, reason: impl Into<String>) {
        self.cancel_reason = reason.into();
    }
}

cancellable_event!(UserConnectEvent, "user_connect", state);

// ============================================================================
// UserChatEvent
// ============================================================================

/// Dispatched when a user sends a chat message.
///
/// Some protocol versions sign chat messages, in which case the adapter marks
/// the message immutable and/or the cancellation frozen.
pub struct UserChatEvent {
    user: BoxedUser,
    message: String,
    mutable: bool,
    state: CancelState,
}

impl UserChatEvent {
    /// Creates a chat event that is neither cancelled nor frozen.
    pub fn new(user: BoxedUser, message: impl Into<String>) -> Self {
        Self {
            user,
            message: message.into(),
            mutable: true,
            state: CancelState::default(),
        }
    }

    /// Sets the initial cancelled flag.
    pub fn cancelled(mut self, cancelled: bool) -> Self {
        self.state = CancelState::with_allowed(cancelled, self.state.is_allowed());
        self
    }

    /// Sets whether the platform can still honor a cancellation.
    pub fn cancel_allowed(mut self, allowed: bool) -> Self {
        self.state = CancelState::with_allowed(self.state.is_cancelled(), allowed);
        self
    }

    /// Sets whether the platform can still honor a message change.
    pub fn message_mutable(mut self, mutable: bool) -> Self {
        self.mutable = mutable;
        self
    }

    /// Returns the user who sent the message.
    pub fn user(&self) -> &BoxedUser {
        &self.user
    }

    /// Returns the message that will be sent.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether the message may be changed.
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Replaces the message that will be sent.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::MutationDenied`] and keeps the original message
    /// when the message is immutable.
    pub fn set_message(&mut self, message: impl Into<String>) -> EventResult<()> {
        if !self.mutable {
            warn!(
                event = self.event_name(),
                user = %self.user.name(),
                "Chat message is immutable in this context, ignoring modification"
            );
            return Err(EventError::MutationDenied {
                event: self.event_name(),
                field: "message",
            });
        }

        self.message = message.into();
        Ok(())
    }
}

cancellable_event!(UserChatEvent, "user_chat", state);

// ============================================================================
// UserDisconnectEvent
// ============================================================================

/// Dispatched after a user disconnected. Purely informational.
pub struct UserDisconnectEvent {
    user: BoxedUser,
}

impl UserDisconnectEvent {
    /// Creates a disconnect event.
    pub fn new(user: BoxedUser) -> Self {
        Self { user }
    }

    /// Returns the user who left.
    pub fn user(&self) -> &BoxedUser {
        &self.user
    }
}

impl Event for UserDisconnectEvent {
    fn event_name(&self) -> &'static str {
        "user_disconnect"
    }
}

// ============================================================================
// ProxyUserSwitchEvent
// ============================================================================

/// A backend server as seen from a proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Server {
    name: String,
    address: Option<SocketAddr>,
}

impl Server {
    /// Creates a server reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
        }
    }

    /// Sets the server's socket address.
    pub fn with_address(mut self, address: SocketAddr) -> Self {
        self.address = Some(address);
        self
    }

    /// Returns the server name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the server address, if known.
    pub fn address(&self) -> Option<SocketAddr> {
        self.address
    }
}

/// Dispatched by proxies when a user moved to another backend server.
pub struct ProxyUserSwitchEvent {
    user: BoxedUser,
    previous: Option<Server>,
    server: Server,
}

impl ProxyUserSwitchEvent {
    /// Creates a switch event. `previous` is `None` on the initial connect.
    pub fn new(user: BoxedUser, previous: Option<Server>, server: Server) -> Self {
        Self {
            user,
            previous,
            server,
        }
    }

    /// Returns the user who switched.
    pub fn user(&self) -> &BoxedUser {
        &self.user
    }

    /// Returns the server the user came from.
    pub fn previous(&self) -> Option<&Server> {
        self.previous.as_ref()
    }

    /// Returns the server the user is now connected to.
    pub fn server(&self) -> &Server {
        &self.server
    }
}

impl Event for ProxyUserSwitchEvent {
    fn event_name(&self) -> &'static str {
        "proxy_user_switch"
    }
}
