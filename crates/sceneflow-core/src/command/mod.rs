//! Global commands.
//!
//! - `router` -- `CommandRouter`, exact-match lookup of normalized command text
//! - `handler` -- `CommandHandler` trait and its type-erased form

pub mod handler;
pub mod router;

pub use handler::CommandHandler;
pub use router::{CommandNames, CommandRouter};

/// Normalize command text: trim surrounding whitespace and lower-case.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}
