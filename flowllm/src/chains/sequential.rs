//! Sequential chain.

use crate::context::CallContext;
use crate::errors::Result;
use crate::handlers::{BoxedHandler, Handler};
use crate::observability::SpanTimer;
use crate::values::Values;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Runs handlers in order, each receiving the previous handler's output.
///
/// The caller's inputs are merged into the first handler's input. The first
/// error stops the chain and is returned as is; later handlers never run.
/// An empty chain returns the merged inputs.
#[derive(Clone, Default)]
pub struct Chain {
    handlers: Vec<BoxedHandler>,
}

impl Chain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a chain from already boxed handlers.
    #[must_use]
    pub fn from_handlers(handlers: Vec<BoxedHandler>) -> Self {
        Self { handlers }
    }

    /// Appends a handler.
    #[must_use]
    pub fn then(mut self, handler: impl Handler + 'static) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    /// Returns the number of handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if the chain has no handlers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[async_trait]
impl Handler for Chain {
    async fn call(&self, ctx: &CallContext, inputs: &[Values]) -> Result<Values> {
        let timer = SpanTimer::start("chain");
        let mut vals = Values::merged(inputs);

        for (step, handler) in self.handlers.iter().enumerate() {
            vals = match handler.call(ctx, std::slice::from_ref(&vals)).await {
                Ok(out) => out,
                Err(e) => {
                    debug!(run_id = %ctx.run_id(), step, error = %e, "Chain stopped");
                    return Err(e);
                }
            };
        }

        debug!(
            run_id = %ctx.run_id(),
            steps = self.handlers.len(),
            duration_ms = timer.finish(),
            "Chain completed"
        );
        Ok(vals)
    }
}
