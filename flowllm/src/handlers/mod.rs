//! The handler trait and function adapters.
//!
//! Handlers are the single unit of composition: chains, parallel chains,
//! memory wrappers, templates and model adapters are all handlers.

mod transforms;

pub use transforms::{MapOutputTo, TrimSpace, TrimSuffix};

use crate::context::CallContext;
use crate::errors::Result;
use crate::values::Values;
use async_trait::async_trait;
use std::fmt::Debug;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// A shareable, type-erased handler.
pub type BoxedHandler = Arc<dyn Handler>;

/// Trait for pipeline handlers.
///
/// A handler accepts zero or more `Values`, which it merges before use, and
/// returns one new `Values` or fails. It must not keep or modify its inputs;
/// the returned bag should be the full state it wants to pass on, which
/// usually means re-merging its input with the keys it adds.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Runs the handler.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The call context; long-running handlers should observe it
    /// * `inputs` - The values to merge and process
    async fn call(&self, ctx: &CallContext, inputs: &[Values]) -> Result<Values>;
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn call(&self, ctx: &CallContext, inputs: &[Values]) -> Result<Values> {
        (**self).call(ctx, inputs).await
    }
}

#[async_trait]
impl<H: Handler + ?Sized> Handler for Box<H> {
    async fn call(&self, ctx: &CallContext, inputs: &[Values]) -> Result<Values> {
        (**self).call(ctx, inputs).await
    }
}

/// A handler backed by a synchronous function over the merged inputs.
pub struct FnHandler<F>
where
    F: Fn(Values) -> Result<Values> + Send + Sync,
{
    func: F,
}

impl<F> FnHandler<F>
where
    F: Fn(Values) -> Result<Values> + Send + Sync,
{
    /// Creates a new function-based handler.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Debug for FnHandler<F>
where
    F: Fn(Values) -> Result<Values> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: Fn(Values) -> Result<Values> + Send + Sync,
{
    async fn call(&self, _ctx: &CallContext, inputs: &[Values]) -> Result<Values> {
        (self.func)(Values::merged(inputs))
    }
}

/// A handler backed by an async function.
///
/// The function receives a clone of the call context and the merged inputs.
pub struct AsyncFnHandler<F, Fut>
where
    F: Fn(CallContext, Values) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Values>> + Send,
{
    func: F,
    _phantom: PhantomData<fn() -> Fut>,
}

impl<F, Fut> AsyncFnHandler<F, Fut>
where
    F: Fn(CallContext, Values) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Values>> + Send,
{
    /// Creates a new async function-based handler.
    pub const fn new(func: F) -> Self {
        Self {
            func,
            _phantom: PhantomData,
        }
    }
}

impl<F, Fut> Debug for AsyncFnHandler<F, Fut>
where
    F: Fn(CallContext, Values) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Values>> + Send,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncFnHandler").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> Handler for AsyncFnHandler<F, Fut>
where
    F: Fn(CallContext, Values) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Values>> + Send,
{
    async fn call(&self, ctx: &CallContext, inputs: &[Values]) -> Result<Values> {
        (self.func)(ctx.clone(), Values::merged(inputs)).await
    }
}

/// Wraps a synchronous function as a handler.
pub const fn handler_fn<F>(func: F) -> FnHandler<F>
where
    F: Fn(Values) -> Result<Values> + Send + Sync,
{
    FnHandler::new(func)
}

/// Wraps an async function as a handler.
pub const fn async_handler_fn<F, Fut>(func: F) -> AsyncFnHandler<F, Fut>
where
    F: Fn(CallContext, Values) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Values>> + Send,
{
    AsyncFnHandler::new(func)
}
