//! Sender and user abstractions.
//!
//! The core treats whoever triggered an event or a command as an opaque
//! capability set supplied by the platform adapter: it can be named, asked
//! for a permission, and sent a message.
//!
//! - [`ChatUser`] - the shared capability set (console and players)
//! - [`User`] - a connected player, with a stable id
//! - [`Sender`] - the polymorphic command sender placed into a
//!   [`Context`](crate::Context)

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

/// Something that can receive messages and hold permissions.
pub trait ChatUser: Send + Sync {
    /// Returns the display name.
    fn name(&self) -> &str;

    /// Returns whether this user holds `permission`.
    fn has_permission(&self, permission: &str) -> bool;

    /// Sends a plain-text message to this user.
    fn send_message(&self, message: &str);
}

/// A player connected to the platform.
pub trait User: ChatUser {
    /// Returns the unique id of this player.
    fn id(&self) -> Uuid;

    /// Disconnects this player with the given reason.
    fn disconnect(&self, reason: &str);
}

/// Shared handle to a platform user.
pub type BoxedUser = Arc<dyn User>;

/// The originator of a command invocation.
#[derive(Clone)]
pub enum Sender {
    /// The platform console.
    Console(Arc<dyn ChatUser>),
    /// A connected player.
    User(BoxedUser),
}

impl Sender {
    /// Wraps a console implementation.
    pub fn console(console: impl ChatUser + 'static) -> Self {
        Self::Console(Arc::new(console))
    }

    /// Wraps a user implementation.
    pub fn user(user: impl User + 'static) -> Self {
        Self::User(Arc::new(user))
    }

    /// Returns the sender's display name.
    pub fn name(&self) -> &str {
        match self {
            Self::Console(console) => console.name(),
            Self::User(user) => user.name(),
        }
    }

    /// Returns whether the sender holds `permission`.
    pub fn has_permission(&self, permission: &str) -> bool {
        match self {
            Self::Console(console) => console.has_permission(permission),
            Self::User(user) => user.has_permission(permission),
        }
    }

    /// Sends a plain-text message to the sender.
    pub fn send_message(&self, message: &str) {
        match self {
            Self::Console(console) => console.send_message(message),
            Self::User(user) => user.send_message(message),
        }
    }

    /// Returns `true` if the sender is the console.
    pub fn is_console(&self) -> bool {
        matches!(self, Self::Console(_))
    }

    /// Returns the user, if the sender is a player.
    pub fn as_user(&self) -> Option<&BoxedUser> {
        match self {
            Self::User(user) => Some(user),
            Self::Console(_) => None,
        }
    }
}

impl From<BoxedUser> for Sender {
    fn from(user: BoxedUser) -> Self {
        Self::User(user)
    }
}

impl fmt::Debug for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Console(console) => f
                .debug_tuple("Console")
                .field(&console.name())
                .finish(),
            Self::User(user) => f
                .debug_struct("User")
                .field("name", &user.name())
                .field("id", &user.id())
                .finish(),
        }
    }
}
