//! Example Plugin
//!
//! Runs the example plugin on a simulated platform, either through a scripted
//! session or interactively.
//!
//! # Interactive Commands
//!
//! ```text
//! /example sub Alex   run a command as the player
//! !example            run a command as the console
//! tab ex s            tab complete as the player
//! switch survival     move the player to another server (proxy only)
//! quit                disconnect and shut down
//! anything else       chat as the player
//! ```
//!
//! # Usage
//!
//! ```bash
//! cargo run --package example-plugin -- --platform velocity --op
//! cargo run --package example-plugin -- --interactive
//! ```

mod adapter;
mod plugin;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chameleon::prelude::*;
use clap::{Parser, ValueEnum};
use tracing::info;

use adapter::{DemoAdapter, DemoConsole, DemoPlayer};
use plugin::{EXAMPLE_PERMISSION, EXAMPLE_SUB_PERMISSION, ExamplePlugin};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PlatformArg {
    Paper,
    Velocity,
}

impl PlatformArg {
    fn platform(self) -> Platform {
        match self {
            Self::Paper => Platform::new("paper", "Paper", "1.21.4", PlatformKind::Server),
            Self::Velocity => Platform::new("velocity", "Velocity", "3.4.0", PlatformKind::Proxy),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "example-plugin", about = "Runs the example Chameleon plugin")]
struct Cli {
    /// Configuration file (defaults to ./chameleon.toml if present).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Platform to simulate.
    #[arg(long, value_enum, default_value_t = PlatformArg::Paper)]
    platform: PlatformArg,

    /// Name of the simulated player.
    #[arg(long, default_value = "Steve")]
    player: String,

    /// Grant the player every example permission.
    #[arg(long)]
    op: bool,

    /// Players refused on connect.
    #[arg(long = "ban")]
    banned: Vec<String>,

    /// Simulate a platform that cannot change or cancel chat messages.
    #[arg(long)]
    signed_chat: bool,

    /// Read actions from stdin instead of running the scripted session.
    #[arg(short, long)]
    interactive: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = Chameleon::builder(cli.platform.platform(), ExamplePlugin::new(cli.banned));
    if let Some(path) = &cli.config {
        builder = builder.config_file(path);
    }
    let chameleon = builder.build()?;

    chameleon.enable()?;
    info!(commands = ?chameleon.commands().names(), "Ready");

    let permissions = if cli.op {
        vec![EXAMPLE_PERMISSION.to_string(), EXAMPLE_SUB_PERMISSION.to_string()]
    } else {
        vec![EXAMPLE_PERMISSION.to_string()]
    };
    let player = DemoPlayer::new(cli.player, permissions);
    let adapter = DemoAdapter::new(chameleon, !cli.signed_chat);

    if adapter.connect(&player) {
        if cli.interactive {
            interactive(&adapter, &player)?;
        } else {
            scripted(&adapter, &player);
        }
        adapter.disconnect(&player);
    }

    adapter.chameleon().disable();
    Ok(())
}

fn scripted(adapter: &DemoAdapter, player: &Arc<DemoPlayer>) {
    let as_player = Sender::User(player.clone());
    let console = Sender::console(DemoConsole);

    adapter.chat(player, "hello darn world");
    adapter.chat(player, "buy spam here");

    adapter.command(as_player.clone(), "example");
    adapter.command(as_player.clone(), "ex sub Alex");
    adapter.command(as_player.clone(), "ex unknown");
    adapter.command(console.clone(), "example");
    adapter.command(console, "warp");

    let suggestions = adapter.tab_complete(as_player, "ex ");
    println!("[tab] {}", suggestions.join(", "));

    adapter.switch_server(player, Some("lobby"), "survival");
}

fn interactive(adapter: &DemoAdapter, player: &Arc<DemoPlayer>) -> Result<()> {
    let as_player = Sender::User(player.clone());
    let console = Sender::console(DemoConsole);
    let mut server = String::from("lobby");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);

        if line == "quit" {
            break;
        } else if let Some(command) = line.strip_prefix('/') {
            adapter.command(as_player.clone(), command);
        } else if let Some(command) = line.strip_prefix('!') {
            adapter.command(console.clone(), command);
        } else if let Some(partial) = line.strip_prefix("tab ") {
            let suggestions = adapter.tab_complete(as_player.clone(), partial);
            println!("[tab] {}", suggestions.join(", "));
        } else if let Some(target) = line.strip_prefix("switch ") {
            adapter.switch_server(player, Some(server.as_str()), target.trim());
            server = target.trim().to_string();
        } else if !line.is_empty() {
            adapter.chat(player, line);
        }
    }

    Ok(())
}
