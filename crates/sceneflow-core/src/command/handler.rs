//! Command handler trait.

use std::future::Future;

use futures_util::future::BoxFuture;
use sceneflow_types::error::EngineError;

use crate::dispatch::Context;

/// Behavior bound to one or more global command names.
///
/// `validate` runs before `run`; when it returns `false` the command is
/// skipped (not failed) and routing continues as if it did not match.
pub trait CommandHandler: Send + Sync {
    fn validate(&self, _ctx: &Context<'_>) -> impl Future<Output = bool> + Send {
        async { true }
    }

    fn run(&self, ctx: &Context<'_>) -> impl Future<Output = Result<(), EngineError>> + Send;
}

/// Object-safe version of [`CommandHandler`] with boxed futures.
pub(crate) trait CommandHandlerDyn: Send + Sync {
    fn validate_boxed<'a>(&'a self, ctx: &'a Context<'a>) -> BoxFuture<'a, bool>;

    fn run_boxed<'a>(&'a self, ctx: &'a Context<'a>) -> BoxFuture<'a, Result<(), EngineError>>;
}

impl<T: CommandHandler> CommandHandlerDyn for T {
    fn validate_boxed<'a>(&'a self, ctx: &'a Context<'a>) -> BoxFuture<'a, bool> {
        Box::pin(self.validate(ctx))
    }

    fn run_boxed<'a>(&'a self, ctx: &'a Context<'a>) -> BoxFuture<'a, Result<(), EngineError>> {
        Box::pin(self.run(ctx))
    }
}
