//! Foundation layer: the event contract, priorities, senders and platforms.

pub mod event;
pub mod platform;
pub mod priority;
pub mod user;

pub use event::{AsAny, CancelState, Cancellable, Event};
pub use platform::{Platform, PlatformKind, PlatformTarget};
pub use priority::Priority;
pub use user::{BoxedUser, ChatUser, Sender, User};
