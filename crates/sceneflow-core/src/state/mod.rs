//! Conversation state.
//!
//! - `store` -- `StateStore`, the cache-first, write-through map from a
//!   conversation to its current scene name
//! - `session` -- `SessionData`, ephemeral per-conversation key/value data

pub mod session;
pub mod store;

pub use session::SessionData;
pub use store::StateStore;
