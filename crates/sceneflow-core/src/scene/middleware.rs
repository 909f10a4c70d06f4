//! Middleware run ahead of scene-local handling.

use std::future::Future;

use futures_util::future::BoxFuture;
use sceneflow_types::error::EngineError;

use crate::dispatch::Context;

/// A step executed, in registration order, before a scene's `handle`.
///
/// Returning an error aborts the event; the scene's `handle` does not run.
pub trait Middleware: Send + Sync {
    fn call(&self, ctx: &Context<'_>) -> impl Future<Output = Result<(), EngineError>> + Send;
}

pub(crate) trait MiddlewareDyn: Send + Sync {
    fn call_boxed<'a>(&'a self, ctx: &'a Context<'a>) -> BoxFuture<'a, Result<(), EngineError>>;
}

impl<T: Middleware> MiddlewareDyn for T {
    fn call_boxed<'a>(&'a self, ctx: &'a Context<'a>) -> BoxFuture<'a, Result<(), EngineError>> {
        Box::pin(self.call(ctx))
    }
}
