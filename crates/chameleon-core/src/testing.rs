//! Shared doubles for unit tests.

use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::bus::EventBus;
use crate::command::CommandRegistry;
use crate::context::{AppHandle, Application};
use crate::foundation::{ChatUser, Platform, PlatformKind, Sender, User};

pub(crate) type Inbox = Arc<Mutex<Vec<String>>>;

pub(crate) struct TestApp {
    bus: EventBus,
    platform: Platform,
    commands: CommandRegistry,
}

impl TestApp {
    pub(crate) fn new() -> Self {
        let platform = Platform::new("test", "Test", "1.0", PlatformKind::Server);
        Self {
            bus: EventBus::new(),
            commands: CommandRegistry::new(platform.clone()),
            platform,
        }
    }

    pub(crate) fn handle() -> AppHandle {
        Arc::new(Self::new())
    }
}

impl Application for TestApp {
    fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    fn platform(&self) -> &Platform {
        &self.platform
    }

    fn commands(&self) -> &CommandRegistry {
        &self.commands
    }
}

struct Console {
    inbox: Inbox,
}

impl ChatUser for Console {
    fn name(&self) -> &str {
        "CONSOLE"
    }

    fn has_permission(&self, _permission: &str) -> bool {
        true
    }

    fn send_message(&self, message: &str) {
        self.inbox.lock().push(message.to_string());
    }
}

struct Player {
    name: String,
    permissions: Vec<String>,
    inbox: Inbox,
}

impl ChatUser for Player {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    fn send_message(&self, message: &str) {
        self.inbox.lock().push(message.to_string());
    }
}

impl User for Player {
    fn id(&self) -> Uuid {
        Uuid::nil()
    }

    fn disconnect(&self, _reason: &str) {}
}

/// A console sender holding every permission, plus its inbox.
pub(crate) fn console() -> (Sender, Inbox) {
    let inbox = Inbox::default();
    let sender = Sender::console(Console {
        inbox: Arc::clone(&inbox),
    });
    (sender, inbox)
}

/// A player sender holding exactly `permissions`, plus its inbox.
pub(crate) fn player(name: &str, permissions: &[&str]) -> (Sender, Inbox) {
    let inbox = Inbox::default();
    let sender = Sender::user(Player {
        name: name.to_string(),
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        inbox: Arc::clone(&inbox),
    });
    (sender, inbox)
}
