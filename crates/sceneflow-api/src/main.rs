//! sceneflow CLI entry point.
//!
//! Binary name: `sflow`
//!
//! Parses CLI arguments, installs tracing, initializes the database and
//! dispatches to the command handlers.

mod cli;
mod state;

use clap::Parser;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    sceneflow_observe::init_tracing(cli.otel, cli::log_directive(cli.verbose, cli.quiet))
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let state = AppState::init().await?;

    let result = match cli.command {
        Commands::Chat { peer, memory } => cli::chat::loop_runner::run_chat_loop(&state, &peer, memory).await,
        Commands::State { action } => cli::state::handle_state_command(action, &state, cli.json).await,
        Commands::Docs { action } => cli::docs::handle_docs_command(action, &state, cli.json).await,
    };

    sceneflow_observe::shutdown_tracing();
    result
}
