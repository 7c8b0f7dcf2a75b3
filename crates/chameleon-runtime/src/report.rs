//! Warnings a platform adapter emits when a listener changed event state the
//! platform could no longer honor.
//!
//! Some platforms only learn about an event after the fact (a signed chat
//! message, an already completed login). Listeners may still try to cancel or
//! rewrite it; the adapter then reports the attempt here instead of failing.

use chameleon_core::{Cancellable, ChatUser, UserChatEvent};
use tracing::warn;

/// Reports that a chat message was changed but the platform kept the original.
pub fn report_chat_modification_failure(user: &dyn ChatUser) {
    warn!(
        user = %user.name(),
        "A listener modified a chat message, but the change cannot be applied on this platform"
    );
}

/// Reports that a chat message was cancelled but the platform delivered it anyway.
pub fn report_chat_cancellation_failure(user: &dyn ChatUser) {
    warn!(
        user = %user.name(),
        "A listener cancelled a chat message, but the cancellation cannot be applied on this platform"
    );
}

/// Compares the state of a chat event before and after dispatch and reports
/// every change the platform could not apply.
///
/// Returns `true` when nothing had to be reported.
pub fn reconcile_chat(
    user: &dyn ChatUser,
    original_message: &str,
    event: &UserChatEvent,
    can_modify: bool,
    can_cancel: bool,
) -> bool {
    let mut clean = true;
    if !can_modify && event.message() != original_message {
        report_chat_modification_failure(user);
        clean = false;
    }
    if !can_cancel && event.is_cancelled() {
        report_chat_cancellation_failure(user);
        clean = false;
    }
    clean
}
