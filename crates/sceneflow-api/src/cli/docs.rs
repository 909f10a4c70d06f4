//! Document collection subcommands.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use crate::state::AppState;

/// Longest body preview shown in the table.
const PREVIEW_CHARS: usize = 60;

/// Document subcommands.
#[derive(Subcommand)]
pub enum DocsCommand {
    /// List the documents of a collection.
    #[command(alias = "ls")]
    List {
        /// Collection name.
        collection: String,
    },

    /// Delete every document of a collection.
    Clear {
        /// Collection name.
        collection: String,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        force: bool,
    },

    /// Drop a collection entirely.
    Drop {
        /// Collection name.
        collection: String,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        force: bool,
    },

    /// List collections and their sizes.
    Collections,
}

/// Handle a docs subcommand.
pub async fn handle_docs_command(cmd: DocsCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        DocsCommand::List { collection } => docs_list(state, &collection, json).await,
        DocsCommand::Clear { collection, force } => docs_clear(state, &collection, force, json).await,
        DocsCommand::Drop { collection, force } => docs_drop(state, &collection, force, json).await,
        DocsCommand::Collections => docs_collections(state, json).await,
    }
}

fn preview(value: &serde_json::Value) -> String {
    let text = value.to_string();
    if text.chars().count() > PREVIEW_CHARS {
        let cut: String = text.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{cut}...")
    } else {
        text
    }
}

async fn docs_list(state: &AppState, collection: &str, json: bool) -> Result<()> {
    let documents = state.documents.get_all(collection).await?;

    if json {
        let result = serde_json::json!({
            "collection": collection,
            "documents": documents,
            "count": documents.len(),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if documents.is_empty() {
        println!();
        println!(
            "  {} Collection '{}' is empty.",
            style("i").blue().bold(),
            style(collection).cyan(),
        );
        println!();
        return Ok(());
    }

    println!();
    println!(
        "  Documents in '{}' ({} entries)",
        style(collection).cyan(),
        documents.len(),
    );
    println!();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Id").fg(Color::White),
        Cell::new("Body").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
    ]);

    for doc in &documents {
        table.add_row(vec![
            Cell::new(doc.id.to_string()).fg(Color::Cyan),
            Cell::new(preview(&doc.data)).fg(Color::DarkGrey),
            Cell::new(doc.updated_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        ]);
    }

    println!("{table}");
    println!();
    Ok(())
}

async fn docs_clear(state: &AppState, collection: &str, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = confirm(&format!(
            "Delete every document in '{}'?",
            style(collection).cyan()
        ))?;
        if !confirmed {
            println!("  {}", style("Cancelled.").dim());
            return Ok(());
        }
    }

    let cleared = state.documents.clear(collection).await?;

    if json {
        let result = serde_json::json!({
            "collection": collection,
            "cleared": cleared,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!();
        println!(
            "  {} Cleared collection '{}'",
            style("ok").green(),
            style(collection).cyan(),
        );
        println!();
    }
    Ok(())
}

async fn docs_drop(state: &AppState, collection: &str, force: bool, json: bool) -> Result<()> {
    if !force && !json {
        let confirmed = confirm(&format!(
            "Drop collection '{}' and all of its documents?",
            style(collection).cyan()
        ))?;
        if !confirmed {
            println!("  {}", style("Cancelled.").dim());
            return Ok(());
        }
    }

    let existed = state.documents.delete_collection(collection).await?;

    if json {
        let result = serde_json::json!({
            "collection": collection,
            "dropped": existed,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    if existed {
        println!(
            "  {} Dropped collection '{}'",
            style("ok").green(),
            style(collection).cyan(),
        );
    } else {
        println!(
            "  {} Collection '{}' did not exist.",
            style("i").blue().bold(),
            style(collection).cyan(),
        );
    }
    println!();
    Ok(())
}

/// Ask a yes/no question on the terminal.
fn confirm(question: &str) -> Result<bool> {
    let term = console::Term::stdout();
    term.write_str(&format!("  {question} [y/N] "))?;
    let answer = term.read_line()?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn docs_collections(state: &AppState, json: bool) -> Result<()> {
    let names = state.documents.list_collections().await?;
    let mut counts = Vec::with_capacity(names.len());
    for name in &names {
        counts.push(state.documents.get_all(name).await?.len());
    }

    if json {
        let collections: Vec<_> = names
            .iter()
            .zip(&counts)
            .map(|(name, count)| serde_json::json!({"name": name, "count": count}))
            .collect();
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "collections": collections }))?);
        return Ok(());
    }

    if names.is_empty() {
        println!();
        println!("  {} No collections yet.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Collection").fg(Color::White),
        Cell::new("Documents").fg(Color::White),
    ]);
    for (name, count) in names.iter().zip(&counts) {
        let role = if *name == state.config.engine.state_collection {
            Color::Green
        } else {
            Color::Cyan
        };
        table.add_row(vec![Cell::new(name).fg(role), Cell::new(count)]);
    }

    println!();
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
    use serde_json::json;

    use super::*;

    fn app() -> AppState {
        AppState::with_documents(
            GlobalConfig::default(),
            PathBuf::from(".sceneflow-test"),
            BoxDocumentStore::new(MemoryDocumentStore::new()),
        )
    }

    #[tokio::test]
    async fn test_drop_removes_collection() {
        let app = app();
        app.documents.add("cart", json!({"userId": "1"})).await.unwrap();
        app.documents.add("pizzas", json!({"name": "Маргарита"})).await.unwrap();

        docs_drop(&app, "cart", true, true).await.unwrap();

        assert_eq!(app.documents.list_collections().await.unwrap(), vec!["pizzas"]);
        docs_drop(&app, "cart", true, true).await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_with_force_empties_collection() {
        let app = app();
        app.documents.add("cart", json!({"userId": "1"})).await.unwrap();

        docs_clear(&app, "cart", true, true).await.unwrap();
        assert!(app.documents.get_all("cart").await.unwrap().is_empty());
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let long = json!({"name": "Маргарита".repeat(10)});
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn test_preview_keeps_short_bodies() {
        assert_eq!(preview(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
