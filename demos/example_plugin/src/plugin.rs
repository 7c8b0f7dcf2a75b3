//! The example plugin: one command with a sub-command, a custom event and
//! listeners at several priorities.

use std::sync::Arc;

use chameleon::prelude::*;
use tracing::{debug, info};

/// Permission required for `/example`.
pub const EXAMPLE_PERMISSION: &str = "example.command";
/// Permission required for `/example sub`.
pub const EXAMPLE_SUB_PERMISSION: &str = "example.command.sub";

// ============================================================================
// Custom event
// ============================================================================

/// Dispatched by `/example sub <name>`.
pub struct ExampleCustomEvent {
    pub sender: String,
    pub name: String,
}

impl Event for ExampleCustomEvent {
    fn event_name(&self) -> &'static str {
        "example_custom"
    }
}

// ============================================================================
// Command
// ============================================================================

/// `/example` greets the world and offers a single tab completion.
struct ExampleCommand;

impl CommandExecutor for ExampleCommand {
    fn execute(&self, ctx: &Context) -> Result<(), BoxError> {
        ctx.sender().send_message("Hello, world!");
        Ok(())
    }

    fn tab_complete(&self, _ctx: &Context) -> Vec<String> {
        vec!["tabcomplete".to_string()]
    }
}

/// `/example sub [name]` greets `name` and announces it on the event bus.
fn example_sub(ctx: &Context) {
    let name = ctx.arg(0).unwrap_or(ctx.sender().name()).to_string();
    ctx.sender().send_message(&format!("Hello, {name}!"));

    ctx.app().event_bus().dispatch(ExampleCustomEvent {
        sender: ctx.sender().name().to_string(),
        name,
    });
}

fn example_command() -> Result<Command, BoxError> {
    let sub = SubCommand::new("sub|test", example_sub)?
        .permission(EXAMPLE_SUB_PERMISSION)
        .permission_message("You may not use the sub-command.");

    Ok(Command::builder("example|ex")
        .permission(EXAMPLE_PERMISSION)
        .permission_message("You do not have permission to execute this command.")
        .condition(
            Condition::new(|ctx| !ctx.sender().is_console())
                .name("in-game")
                .message("This command can only be used in-game."),
        )
        .with_sub_command(sub)
        .executor(ExampleCommand)
        .build()?)
}

// ============================================================================
// Audit listeners
// ============================================================================

/// Monitor-tier listeners registered by selector rather than by event type.
fn audit_listeners() -> Vec<(&'static str, EventSelector, ErasedHandler)> {
    let cancellations: ErasedHandler = Arc::new(|event: &mut dyn Event| -> Result<(), BoxError> {
        if event.as_cancellable().is_some_and(|c| c.is_cancelled()) {
            info!(event = event.event_name(), "Event cancelled");
        }
        Ok(())
    });

    let custom: ErasedHandler = Arc::new(|event: &mut dyn Event| -> Result<(), BoxError> {
        debug!(event = event.event_name(), "Custom event audited");
        Ok(())
    });

    vec![
        ("cancellation-audit", EventSelector::Cancellable, cancellations),
        (
            "custom-audit",
            EventSelector::exact::<ExampleCustomEvent>(),
            custom,
        ),
    ]
}

// ============================================================================
// Plugin
// ============================================================================

/// Words the chat filter masks.
const FILTERED_WORDS: &[&str] = &["darn", "heck"];

pub struct ExamplePlugin {
    banned: Vec<String>,
}

impl ExamplePlugin {
    pub fn new(banned: Vec<String>) -> Self {
        Self { banned }
    }
}

impl ChameleonPlugin for ExamplePlugin {
    fn name(&self) -> &str {
        "example"
    }

    fn on_load(&self, chameleon: &Chameleon) -> Result<(), BoxError> {
        info!(
            platform = %chameleon.platform(),
            "Example plugin loaded"
        );
        Ok(())
    }

    fn on_enable(&self, chameleon: &Chameleon) -> Result<(), BoxError> {
        let bus = chameleon.event_bus();

        let banned = self.banned.clone();
        bus.subscribe(Priority::First, move |event: &mut UserConnectEvent| {
            let name = event.user().name().to_string();
            if banned.iter().any(|b| b.eq_ignore_ascii_case(&name)) {
                event.set_cancel_reason("You are banned from this server.");
                event.set_cancelled(true)?;
            }
            Ok::<_, EventError>(())
        });

        bus.subscribe(Priority::Third, |event: &mut UserConnectEvent| {
            if !event.is_cancelled() {
                let name = event.user().name().to_string();
                event.user().send_message(&format!("Welcome, {name}!"));
            }
        });

        bus.subscribe(Priority::First, |event: &mut UserChatEvent| {
            let mut message = event.message().to_string();
            for word in FILTERED_WORDS {
                message = message.replace(word, &"*".repeat(word.len()));
            }
            if message != event.message() {
                event.set_message(message)?;
            }
            Ok::<_, EventError>(())
        });

        bus.subscribe(Priority::Second, |event: &mut UserChatEvent| {
            if event.message().contains("spam") {
                event.set_cancelled(true)?;
            }
            Ok::<_, EventError>(())
        });

        bus.subscribe(Priority::Monitor, |event: &mut UserChatEvent| {
            info!(
                user = %event.user().name(),
                message = %event.message(),
                cancelled = event.is_cancelled(),
                "Chat"
            );
        });

        bus.subscribe(Priority::Monitor, |event: &mut ProxyUserSwitchEvent| {
            info!(
                user = %event.user().name(),
                from = event.previous().map(Server::name).unwrap_or("-"),
                to = %event.server().name(),
                "Server switch"
            );
        });

        bus.subscribe(Priority::Monitor, |event: &mut UserDisconnectEvent| {
            info!(user = %event.user().name(), "Disconnected");
        });

        bus.subscribe(Priority::Third, |event: &mut ExampleCustomEvent| {
            info!(sender = %event.sender, name = %event.name, "Custom event received");
        });

        for (name, selector, handler) in audit_listeners() {
            bus.register(
                Listener::new()
                    .name(name)
                    .priority(Priority::Monitor)
                    .select(selector)
                    .erased(handler),
            )?;
        }

        chameleon.register_command(example_command()?)?;
        Ok(())
    }

    fn on_disable(&self, _chameleon: &Chameleon) -> Result<(), BoxError> {
        info!("Example plugin disabled");
        Ok(())
    }
}
