//! A simulated platform: players print what they receive to stdout, and the
//! adapter turns "native" actions into canonical events and commands.

use std::sync::Arc;

use chameleon::prelude::*;
use chameleon::runtime::reconcile_chat;
use tracing::warn;
use uuid::Uuid;

// ============================================================================
// Users
// ============================================================================

pub struct DemoPlayer {
    id: Uuid,
    name: String,
    permissions: Vec<String>,
}

impl DemoPlayer {
    pub fn new(name: impl Into<String>, permissions: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            permissions,
        })
    }
}

impl ChatUser for DemoPlayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission || p == "*")
    }

    fn send_message(&self, message: &str) {
        println!("[to {}] {message}", self.name);
    }
}

impl User for DemoPlayer {
    fn id(&self) -> Uuid {
        self.id
    }

    fn disconnect(&self, reason: &str) {
        println!("[{} disconnected] {reason}", self.name);
    }
}

pub struct DemoConsole;

impl ChatUser for DemoConsole {
    fn name(&self) -> &str {
        "CONSOLE"
    }

    fn has_permission(&self, _permission: &str) -> bool {
        true
    }

    fn send_message(&self, message: &str) {
        println!("[console] {message}");
    }
}

// ============================================================================
// Adapter
// ============================================================================

/// Bridges simulated platform callbacks into a [`Chameleon`] application.
pub struct DemoAdapter {
    chameleon: Chameleon,
    /// Whether chat changes made by listeners can still be applied.
    chat_mutable: bool,
}

impl DemoAdapter {
    pub fn new(chameleon: Chameleon, chat_mutable: bool) -> Self {
        Self {
            chameleon,
            chat_mutable,
        }
    }

    pub fn chameleon(&self) -> &Chameleon {
        &self.chameleon
    }

    /// Returns `false` if a listener refused the connection.
    pub fn connect(&self, player: &Arc<DemoPlayer>) -> bool {
        let event = self
            .chameleon
            .dispatch(UserConnectEvent::new(player.clone(), false));

        if event.is_cancelled() {
            player.disconnect(event.cancel_reason());
            return false;
        }
        true
    }

    /// Builds the chat event the platform hands to listeners. Signed chat
    /// can be neither rewritten nor cancelled.
    fn chat_event(&self, player: &Arc<DemoPlayer>, message: &str) -> UserChatEvent {
        UserChatEvent::new(player.clone(), message)
            .message_mutable(self.chat_mutable)
            .cancel_allowed(self.chat_mutable)
    }

    /// Returns the line delivered to other players, if any.
    pub fn chat(&self, player: &Arc<DemoPlayer>, message: &str) -> Option<String> {
        let event = self.chameleon.dispatch(self.chat_event(player, message));

        let delivered = if reconcile_chat(
            player.as_ref(),
            message,
            &event,
            self.chat_mutable,
            self.chat_mutable,
        ) {
            (!event.is_cancelled()).then(|| event.message().to_string())
        } else {
            Some(message.to_string())
        };

        if let Some(line) = &delivered {
            println!("<{}> {line}", player.name());
        }
        delivered
    }

    pub fn switch_server(&self, player: &Arc<DemoPlayer>, previous: Option<&str>, server: &str) {
        if self.chameleon.platform().kind() != PlatformKind::Proxy {
            warn!(platform = %self.chameleon.platform(), "Server switching needs a proxy platform");
            return;
        }

        self.chameleon.dispatch(ProxyUserSwitchEvent::new(
            player.clone(),
            previous.map(Server::new),
            Server::new(server),
        ));
    }

    pub fn disconnect(&self, player: &Arc<DemoPlayer>) {
        self.chameleon
            .dispatch(UserDisconnectEvent::new(player.clone()));
    }

    /// Runs a command line such as `example sub Alex`.
    pub fn command(&self, sender: Sender, line: &str) {
        let mut parts = line.split_whitespace();
        let Some(label) = parts.next() else {
            return;
        };

        if self
            .chameleon
            .dispatch_command(sender.clone(), label, parts)
            .is_none()
        {
            sender.send_message(&format!("Unknown command: {label}"));
        }
    }

    /// Completes a partial command line; a trailing space starts a new argument.
    pub fn tab_complete(&self, sender: Sender, line: &str) -> Vec<String> {
        let mut parts: Vec<&str> = line.split_whitespace().collect();
        if line.ends_with(' ') {
            parts.push("");
        }
        if parts.is_empty() {
            return Vec::new();
        }

        let label = parts.remove(0);
        self.chameleon.tab_complete(sender, label, parts)
    }
}
