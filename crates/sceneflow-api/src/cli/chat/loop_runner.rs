//! Main chat loop orchestration.
//!
//! Builds a dispatcher over the configured store and a terminal transport,
//! then feeds it one inbound event per input line until the user exits.

use std::io::Write;

use console::style;
use rustyline_async::SharedWriter;
use sceneflow_core::dispatch::Dispatcher;
use sceneflow_core::persistence::BoxDocumentStore;
use sceneflow_core::transport::BoxTransport;
use sceneflow_infra::memory::MemoryDocumentStore;
use sceneflow_types::conversation::PeerId;
use sceneflow_types::event::InboundEvent;
use tracing::{info, warn};

use crate::state::AppState;

use super::commands::{self, ChatCommand};
use super::demo;
use super::input::{ChatInput, InputEvent};
use super::transport::{TerminalTransport, render_keyboard};

/// Run the interactive chat loop as conversation `peer`.
pub async fn run_chat_loop(state: &AppState, peer: &str, in_memory: bool) -> anyhow::Result<()> {
    let peer = PeerId::from(peer);
    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, writer) =
        ChatInput::new(prompt).map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;
    let mut out = writer.clone();

    let documents = if in_memory {
        BoxDocumentStore::new(MemoryDocumentStore::new())
    } else {
        state.documents.clone()
    };
    let transport = TerminalTransport::new(writer);

    let mut builder = Dispatcher::builder(
        state.config.engine.clone(),
        documents,
        BoxTransport::new(transport.clone()),
    );
    demo::configure(&mut builder)?;
    let dispatcher = builder.build()?;

    let storage = if in_memory {
        "memory".to_string()
    } else {
        state.data_dir.display().to_string()
    };
    print_banner(&mut out, &peer, &storage)?;
    info!(%peer, in_memory, "chat session started");

    // Greets a new conversation and re-greets a returning one.
    deliver(&dispatcher, &mut out, InboundEvent::text(peer.clone(), "start")).await?;

    loop {
        let line = match chat_input.read_line().await {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                writeln!(out, "  {}", style("Press Ctrl+D to exit, or keep chatting.").dim())?;
                continue;
            }
            InputEvent::Message(text) if text.is_empty() => continue,
            InputEvent::Message(text) => text,
        };

        let event = match commands::parse(&line) {
            None => InboundEvent::text(peer.clone(), line),
            Some(ChatCommand::Press(number)) => match transport.button(&peer, number) {
                Some(button) => {
                    let event = InboundEvent::text(peer.clone(), button.text);
                    match button.payload {
                        Some(payload) => event.with_payload(payload),
                        None => event,
                    }
                }
                None => {
                    writeln!(out, "  {} No button #{number} on the current keyboard.", style("?").yellow().bold())?;
                    continue;
                }
            },
            Some(ChatCommand::Help) => {
                commands::print_help();
                continue;
            }
            Some(ChatCommand::Clear) => {
                chat_input.clear();
                continue;
            }
            Some(ChatCommand::Exit) => break,
            Some(ChatCommand::State) => {
                let scene = dispatcher.states().get(&peer).await?;
                writeln!(
                    out,
                    "  {} {}",
                    style("scene:").dim(),
                    style(scene.as_deref().unwrap_or("(none)")).green()
                )?;
                continue;
            }
            Some(ChatCommand::Keyboard) => {
                match transport.last_keyboard(&peer) {
                    Some(keyboard) => write!(out, "{}", render_keyboard(&keyboard))?,
                    None => writeln!(out, "  {}", style("No keyboard shown yet.").dim())?,
                }
                continue;
            }
            Some(ChatCommand::Unknown(cmd)) => {
                writeln!(
                    out,
                    "  {} Unknown command: {}. Type /help for available commands.",
                    style("?").yellow().bold(),
                    style(cmd).dim()
                )?;
                continue;
            }
        };

        deliver(&dispatcher, &mut out, event).await?;
    }

    chat_input.flush();
    println!("\n  {}", style("Session ended.").dim());
    Ok(())
}

/// Dispatch one event; engine errors are shown and the session continues.
async fn deliver(
    dispatcher: &Dispatcher,
    out: &mut SharedWriter,
    event: InboundEvent,
) -> std::io::Result<()> {
    if let Err(err) = dispatcher.dispatch(event).await {
        warn!(error = %err, "dispatch failed");
        writeln!(out, "  {} {err}", style("!").red().bold())?;
    }
    Ok(())
}

fn print_banner(out: &mut SharedWriter, peer: &PeerId, storage: &str) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {} {}", style("*").cyan(), style("sceneflow demo bot").cyan().bold())?;
    writeln!(out, "  {}  {}", style("Conversation:").bold(), style(peer).dim())?;
    writeln!(out, "  {}  {}", style("State:").bold(), style(storage).dim())?;
    writeln!(out)?;
    writeln!(out, "  {}", style("Type /help for commands, #N to press a button, Ctrl+D to exit").dim())?;
    writeln!(out, "  {}", style("---").dim())?;
    writeln!(out)
}
