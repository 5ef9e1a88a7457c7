//! Bounded-concurrency parallel chain.

use crate::cancellation::BoundedTaskGroup;
use crate::config::EngineConfig;
use crate::context::CallContext;
use crate::errors::Result;
use crate::handlers::{BoxedHandler, Handler};
use crate::observability::SpanTimer;
use crate::values::Values;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs handlers concurrently, at most `max_parallel` at a time, and merges
/// their outputs.
///
/// Every branch receives the same merged inputs. Outputs are merged in
/// completion order, so when two branches write the same key the one that
/// finished last wins; branches are expected to write disjoint keys.
///
/// The first branch error cancels the group's token, so running branches are
/// notified and no further branches start, and that error is returned at
/// once. If the caller's context ends first, its error is returned instead.
/// No partial result is ever returned alongside an error.
#[derive(Clone)]
pub struct ParallelChain {
    max_parallel: usize,
    branches: Vec<BoxedHandler>,
}

impl ParallelChain {
    /// Creates an empty parallel chain. A bound of zero is treated as one.
    #[must_use]
    pub fn new(max_parallel: usize) -> Self {
        Self {
            max_parallel: max_parallel.max(1),
            branches: Vec::new(),
        }
    }

    /// Creates an empty parallel chain bounded by `config.default_max_parallel`.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.default_max_parallel)
    }

    /// Creates a parallel chain from already boxed handlers.
    #[must_use]
    pub fn from_handlers(max_parallel: usize, branches: Vec<BoxedHandler>) -> Self {
        Self {
            max_parallel: max_parallel.max(1),
            branches,
        }
    }

    /// Adds a branch.
    #[must_use]
    pub fn branch(mut self, handler: impl Handler + 'static) -> Self {
        self.branches.push(Arc::new(handler));
        self
    }

    /// Returns the concurrency bound.
    #[must_use]
    pub const fn max_parallel(&self) -> usize {
        self.max_parallel
    }

    /// Returns the number of branches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    /// Returns true if there are no branches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}

impl std::fmt::Debug for ParallelChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelChain")
            .field("max_parallel", &self.max_parallel)
            .field("branches", &self.branches.len())
            .finish()
    }
}

#[async_trait]
impl Handler for ParallelChain {
    async fn call(&self, ctx: &CallContext, inputs: &[Values]) -> Result<Values> {
        let timer = SpanTimer::start("parallel_chain");
        let shared = Arc::new(Values::merged(inputs));

        let group_ctx = ctx.child();
        // Stops workers on every exit path, including the caller dropping us.
        let _stop = group_ctx.token().drop_guard("parallel chain finished");
        let group = BoundedTaskGroup::new(self.max_parallel, Arc::clone(group_ctx.token()));

        debug!(
            run_id = %ctx.run_id(),
            branches = self.branches.len(),
            max_parallel = self.max_parallel,
            "Parallel chain started"
        );

        let mut rx = group.spawn_all(self.branches.clone(), move |handler: BoxedHandler| {
            let ctx = group_ctx.clone();
            let vals = Arc::clone(&shared);
            async move { handler.call(&ctx, std::slice::from_ref(&*vals)).await }
        });

        let mut results = Values::new();
        loop {
            tokio::select! {
                biased;
                err = ctx.done() => {
                    warn!(run_id = %ctx.run_id(), error = %err, "Parallel chain interrupted");
                    return Err(err);
                }
                msg = rx.recv() => match msg {
                    Some(Ok(out)) => results.extend(out),
                    Some(Err(e)) => {
                        group.cancel_all("branch failed");
                        warn!(run_id = %ctx.run_id(), error = %e, "Parallel branch failed");
                        return Err(e);
                    }
                    None => break,
                },
            }
        }

        // A deadline that passed while the last results arrived still wins.
        if let Some(err) = ctx.err() {
            return Err(err);
        }

        debug!(
            run_id = %ctx.run_id(),
            keys = results.len(),
            duration_ms = timer.finish(),
            "Parallel chain completed"
        );
        Ok(results)
    }
}
