//! Event dispatch.
//!
//! - `dispatcher` -- `Dispatcher` and its builder; routes one inbound event
//! - `context` -- `Context`, the per-event handle given to scenes and commands
//! - `lock` -- `ConversationLocks`, per-conversation serialization

pub mod context;
pub mod dispatcher;
pub mod lock;

pub use context::Context;
pub use dispatcher::{DispatchOutcome, Dispatcher, DispatcherBuilder};
pub use lock::ConversationLocks;
