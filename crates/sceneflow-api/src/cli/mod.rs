//! CLI command definitions for the `sflow` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod docs;
pub mod state;

use clap::{Parser, Subcommand};

/// Drive and inspect sceneflow conversation engines.
#[derive(Parser)]
#[command(name = "sflow", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "SCENEFLOW_OTEL")]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chat with the built-in demo bot in the terminal.
    Chat {
        /// Conversation id to chat as.
        #[arg(long, default_value = "local")]
        peer: String,

        /// Keep state in memory instead of the database.
        #[arg(long)]
        memory: bool,
    },

    /// Inspect or change conversation state.
    State {
        #[command(subcommand)]
        action: state::StateCommand,
    },

    /// Inspect document collections.
    #[command(alias = "doc")]
    Docs {
        #[command(subcommand)]
        action: docs::DocsCommand,
    },
}

/// Default log filter for the verbosity flags; `RUST_LOG` overrides it.
pub fn log_directive(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "warn",
        1 => "info,sceneflow=debug",
        _ => "trace",
    }
}
