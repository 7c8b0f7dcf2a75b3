//! A plugin driven through `Chameleon` the way a platform adapter drives it.

use std::sync::Arc;

use chameleon_core::prelude::*;
use chameleon_runtime::{
    Chameleon, ChameleonConfig, ChameleonPlugin, PluginState, RuntimeError, reconcile_chat,
};
use figment::Jail;
use parking_lot::Mutex;
use uuid::Uuid;

// ============================================================================
// Fixtures
// ============================================================================

struct Player {
    id: Uuid,
    name: &'static str,
    permissions: Vec<&'static str>,
    inbox: Mutex<Vec<String>>,
}

impl Player {
    fn new(name: &'static str, permissions: &[&'static str]) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            name,
            permissions: permissions.to_vec(),
            inbox: Mutex::new(Vec::new()),
        })
    }

    fn inbox(&self) -> Vec<String> {
        self.inbox.lock().clone()
    }
}

impl ChatUser for Player {
    fn name(&self) -> &str {
        self.name
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(&permission)
    }

    fn send_message(&self, message: &str) {
        self.inbox.lock().push(message.to_string());
    }
}

impl User for Player {
    fn id(&self) -> Uuid {
        self.id
    }

    fn disconnect(&self, _reason: &str) {}
}

struct Greeting {
    name: String,
}

impl Event for Greeting {}

/// Records every greeting dispatched by its `greet` command.
struct Greeter {
    greeted: Arc<Mutex<Vec<String>>>,
}

impl ChameleonPlugin for Greeter {
    fn name(&self) -> &str {
        "greeter"
    }

    fn on_enable(&self, chameleon: &Chameleon) -> Result<(), BoxError> {
        let greeted = Arc::clone(&self.greeted);
        chameleon
            .event_bus()
            .subscribe(Priority::Monitor, move |event: &mut Greeting| {
                greeted.lock().push(event.name.clone());
            });

        chameleon.register_command(
            Command::builder("greet|hi")
                .permission("greeter.greet")
                .executor(|ctx: &Context| {
                    let name = ctx.arg(0).unwrap_or("world").to_string();
                    ctx.sender().send_message(&format!("Hello, {name}!"));
                    ctx.app().event_bus().dispatch(Greeting { name });
                })
                .tab_completer(|_| vec!["Alex".to_string(), "Steve".to_string()])
                .build()?,
        )?;
        Ok(())
    }
}

fn greeter() -> (Greeter, Arc<Mutex<Vec<String>>>) {
    let greeted = Arc::new(Mutex::new(Vec::new()));
    (
        Greeter {
            greeted: Arc::clone(&greeted),
        },
        greeted,
    )
}

fn paper() -> Platform {
    Platform::new("paper", "Paper", "1.21", PlatformKind::Server)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_commands_reach_the_event_bus_through_the_app_handle() {
    let (plugin, greeted) = greeter();
    let chameleon = Chameleon::new(paper(), plugin, ChameleonConfig::default());
    chameleon.enable().unwrap();

    let alex = Player::new("Alex", &["greeter.greet"]);
    let outcome = chameleon.dispatch_command(Sender::User(alex.clone()), "HI", ["Steve"]);

    assert_eq!(outcome, Some(Outcome::Executed));
    assert_eq!(alex.inbox(), ["Hello, Steve!"]);
    assert_eq!(*greeted.lock(), vec!["Steve"]);

    assert_eq!(
        chameleon.tab_complete(Sender::User(alex), "greet", [""]),
        ["Alex", "Steve"]
    );
}

#[test]
fn test_disabled_plugin_stops_routing() {
    let (plugin, _) = greeter();
    let chameleon = Chameleon::new(paper(), plugin, ChameleonConfig::default());
    chameleon.enable().unwrap();
    chameleon.disable();

    assert_eq!(chameleon.state(), PluginState::Disabled);
    let alex = Player::new("Alex", &["greeter.greet"]);
    assert_eq!(
        chameleon.dispatch_command(Sender::User(alex), "greet", Vec::<String>::new()),
        None
    );
}

#[test]
fn test_builder_applies_file_configuration() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "chameleon.toml",
            r#"
                debug = true

                [commands]
                disabled = ["hi"]
            "#,
        )?;

        let (plugin, _) = greeter();
        let chameleon = Chameleon::builder(paper(), plugin)
            .search_path(jail.directory())
            .without_env()
            .without_logging()
            .build()
            .map_err(|e| e.to_string())?;

        assert!(chameleon.config().debug);
        chameleon.enable().map_err(|e| e.to_string())?;
        assert!(chameleon.commands().is_empty());
        Ok(())
    });
}

#[test]
fn test_builder_reports_missing_file() {
    let (plugin, _) = greeter();
    let result = Chameleon::builder(paper(), plugin)
        .config_file("does/not/exist/chameleon.toml")
        .without_logging()
        .build();

    assert!(matches!(result, Err(RuntimeError::Config(_))));
}

#[test]
fn test_signed_chat_is_frozen_before_dispatch() {
    let (plugin, _) = greeter();
    let chameleon = Chameleon::new(paper(), plugin, ChameleonConfig::default());
    let attempts = Arc::new(Mutex::new(Vec::new()));

    let seen = Arc::clone(&attempts);
    chameleon
        .event_bus()
        .subscribe(Priority::First, move |event: &mut UserChatEvent| {
            let rewrite = event.set_message(event.message().to_uppercase());
            let cancel = event.set_cancelled(true);
            seen.lock().push((rewrite.clone(), cancel.clone()));
            rewrite.and(cancel)
        });

    let alex = Player::new("Alex", &[]);
    let event = chameleon.dispatch(
        UserChatEvent::new(alex.clone(), "hello")
            .message_mutable(false)
            .cancel_allowed(false),
    );

    assert_eq!(
        *attempts.lock(),
        vec![(
            Err(EventError::MutationDenied {
                event: "user_chat",
                field: "message",
            }),
            Err(EventError::CancellationDenied { event: "user_chat" }),
        )]
    );
    assert_eq!(event.message(), "hello");
    assert!(!event.is_cancelled());
    assert!(reconcile_chat(alex.as_ref(), "hello", &event, false, false));
}
