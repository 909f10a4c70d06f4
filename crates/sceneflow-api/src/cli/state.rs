//! Conversation state subcommands.
//!
//! Reads and writes the durable `{conversationId, state, timestamp}` records
//! through the same cache-first `StateStore` the engine uses.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use sceneflow_types::conversation::PeerId;

use crate::state::AppState;

/// State subcommands.
#[derive(Subcommand)]
pub enum StateCommand {
    /// Show the scene a conversation is in.
    Get {
        /// Conversation id.
        peer: String,
    },

    /// Put a conversation into a scene (no enter/leave hooks run).
    Set {
        /// Conversation id.
        peer: String,

        /// Scene name.
        scene: String,
    },

    /// List every conversation with a stored state.
    #[command(alias = "ls")]
    List,
}

/// Handle a state subcommand.
pub async fn handle_state_command(cmd: StateCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        StateCommand::Get { peer } => state_get(state, &peer, json).await,
        StateCommand::Set { peer, scene } => state_set(state, &peer, &scene, json).await,
        StateCommand::List => state_list(state, json).await,
    }
}

async fn state_get(state: &AppState, peer: &str, json: bool) -> Result<()> {
    let current = state.states().get(&PeerId::from(peer)).await?;

    if json {
        let result = serde_json::json!({
            "conversation": peer,
            "state": current,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    match current {
        Some(scene) => println!(
            "  {} is in scene {}",
            style(peer).cyan(),
            style(scene).green().bold(),
        ),
        None => println!(
            "  {} No state stored for {}; its next event enters the initial scene.",
            style("i").blue().bold(),
            style(peer).cyan(),
        ),
    }
    println!();
    Ok(())
}

async fn state_set(state: &AppState, peer: &str, scene: &str, json: bool) -> Result<()> {
    let scene = scene.trim();
    anyhow::ensure!(!scene.is_empty(), "scene name must not be blank");

    let written = state.states().set(&PeerId::from(peer), scene).await?;

    if json {
        let result = serde_json::json!({
            "conversation": peer,
            "state": written,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        println!(
            "  {} {} is now in scene {}",
            style("ok").green(),
            style(peer).cyan(),
            style(&written).green().bold(),
        );
        println!();
    }
    Ok(())
}

async fn state_list(state: &AppState, json: bool) -> Result<()> {
    let mut records = state.states().records().await?;
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    if json {
        let result = serde_json::json!({
            "collection": state.config.engine.state_collection,
            "states": records,
            "count": records.len(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if records.is_empty() {
        println!();
        println!("  {} No conversation state stored yet.", style("i").blue().bold());
        println!("     Start one with: sflow chat");
        println!();
        return Ok(());
    }

    println!();
    println!(
        "  Conversations in '{}' ({} entries)",
        style(&state.config.engine.state_collection).cyan(),
        records.len(),
    );
    println!();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Conversation").fg(Color::White),
        Cell::new("Scene").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
    ]);

    for record in &records {
        table.add_row(vec![
            Cell::new(&record.conversation_id).fg(Color::Cyan),
            Cell::new(&record.state).fg(Color::Green),
            Cell::new(record.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!("{table}");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use sceneflow_core::persistence::BoxDocumentStore;
    use sceneflow_infra::memory::MemoryDocumentStore;
    use sceneflow_types::config::GlobalConfig;

    use super::*;

    fn app() -> AppState {
        AppState::with_documents(
            GlobalConfig::default(),
            PathBuf::from(".sceneflow-test"),
            BoxDocumentStore::new(MemoryDocumentStore::new()),
        )
    }

    #[tokio::test]
    async fn test_set_then_get_reads_durable_record() {
        let app = app();

        state_set(&app, "42", " catalog ", true).await.unwrap();
        state_get(&app, "42", true).await.unwrap();

        // A fresh StateStore has an empty cache, so this reads the stored record.
        let stored = app.states().get(&PeerId::from("42")).await.unwrap();
        assert_eq!(stored.as_deref(), Some("catalog"));

        let records = app.documents.get_all("user_states").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].str_field("conversationId"), Some("42"));
    }

    #[tokio::test]
    async fn test_set_overwrites_single_record() {
        let app = app();
        state_set(&app, "7", "main", true).await.unwrap();
        state_set(&app, "7", "payment", true).await.unwrap();
        state_list(&app, true).await.unwrap();

        let records = app.states().records().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].state, "payment");
    }

    #[tokio::test]
    async fn test_blank_scene_rejected() {
        let app = app();
        let err = state_set(&app, "7", "   ", true).await.unwrap_err();
        assert!(err.to_string().contains("must not be blank"));
        assert!(app.states().get(&PeerId::from("7")).await.unwrap().is_none());
    }
}
