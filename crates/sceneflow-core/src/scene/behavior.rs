//! Scene capability trait.

use std::future::Future;

use futures_util::future::BoxFuture;
use sceneflow_types::error::EngineError;

use crate::command::normalize;
use crate::dispatch::Context;

/// A named dialogue state.
///
/// `enter` runs after the conversation's state has been switched to this
/// scene, `leave` runs when the conversation moves to a different scene, and
/// `handle` receives every event no global command claimed.
pub trait Scene: Send + Sync {
    fn enter(&self, ctx: &Context<'_>) -> impl Future<Output = Result<(), EngineError>> + Send;

    fn leave(&self, _ctx: &Context<'_>) -> impl Future<Output = Result<(), EngineError>> + Send {
        async { Ok(()) }
    }

    fn handle(&self, ctx: &Context<'_>) -> impl Future<Output = Result<(), EngineError>> + Send;

    /// Payload intents (`{"command": ...}`) this scene handles itself.
    ///
    /// A button carrying one of these intents is routed straight to `handle`,
    /// ahead of any global command with the same name.
    fn actions(&self) -> &[&str] {
        &[]
    }
}

/// Object-safe version of [`Scene`] with boxed futures.
pub(crate) trait SceneDyn: Send + Sync {
    fn enter_boxed<'a>(&'a self, ctx: &'a Context<'a>) -> BoxFuture<'a, Result<(), EngineError>>;

    fn leave_boxed<'a>(&'a self, ctx: &'a Context<'a>) -> BoxFuture<'a, Result<(), EngineError>>;

    fn handle_boxed<'a>(&'a self, ctx: &'a Context<'a>) -> BoxFuture<'a, Result<(), EngineError>>;

    fn understands(&self, command: &str) -> bool;
}

impl<T: Scene> SceneDyn for T {
    fn enter_boxed<'a>(&'a self, ctx: &'a Context<'a>) -> BoxFuture<'a, Result<(), EngineError>> {
        Box::pin(self.enter(ctx))
    }

    fn leave_boxed<'a>(&'a self, ctx: &'a Context<'a>) -> BoxFuture<'a, Result<(), EngineError>> {
        Box::pin(self.leave(ctx))
    }

    fn handle_boxed<'a>(&'a self, ctx: &'a Context<'a>) -> BoxFuture<'a, Result<(), EngineError>> {
        Box::pin(self.handle(ctx))
    }

    fn understands(&self, command: &str) -> bool {
        self.actions().iter().any(|action| normalize(action) == command)
    }
}
