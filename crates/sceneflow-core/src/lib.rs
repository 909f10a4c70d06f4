//! Conversation engine for sceneflow.
//!
//! This crate defines the engine (keyboards, state, commands, scenes, dispatch)
//! and the ports it needs from the outside world: a [`DocumentStore`] for
//! durable state and a [`Transport`] for replies. It depends only on
//! `sceneflow-types` -- never on `sceneflow-infra` or any database/IO crate.

pub mod command;
pub mod dispatch;
pub mod keyboard;
pub mod persistence;
pub mod scene;
pub mod state;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use command::{CommandHandler, CommandRouter};
pub use dispatch::{Context, DispatchOutcome, Dispatcher, DispatcherBuilder};
pub use keyboard::KeyboardRegistry;
pub use persistence::{BoxDocumentStore, DocumentStore};
pub use scene::{Middleware, Scene, SceneManager};
pub use state::{SessionData, StateStore};
pub use transport::{BoxTransport, Transport};
