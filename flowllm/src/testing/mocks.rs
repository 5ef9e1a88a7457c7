//! Mock handlers for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::context::CallContext;
use crate::errors::{FlowError, Result};
use crate::handlers::Handler;
use crate::values::Values;

/// A mock handler that records calls and returns a configurable output.
///
/// Without a configured output it echoes its merged input.
#[derive(Debug, Default)]
pub struct MockHandler {
    output: Mutex<Option<Values>>,
    call_count: AtomicUsize,
    inputs: Mutex<Vec<Values>>,
}

impl MockHandler {
    /// Creates an echoing mock handler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock handler that always returns `output`.
    #[must_use]
    pub fn returning(output: Values) -> Self {
        let handler = Self::new();
        handler.set_output(output);
        handler
    }

    /// Sets the output to return.
    pub fn set_output(&self, output: Values) {
        *self.output.lock() = Some(output);
    }

    /// Returns the number of times the handler was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Returns the merged input of each call.
    #[must_use]
    pub fn recorded_inputs(&self) -> Vec<Values> {
        self.inputs.lock().clone()
    }

    /// Resets call tracking.
    pub fn reset(&self) {
        self.call_count.store(0, Ordering::SeqCst);
        self.inputs.lock().clear();
    }
}

#[async_trait]
impl Handler for MockHandler {
    async fn call(&self, _ctx: &CallContext, inputs: &[Values]) -> Result<Values> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let merged = Values::merged(inputs);
        self.inputs.lock().push(merged.clone());
        Ok(self.output.lock().clone().unwrap_or(merged))
    }
}

/// A handler that always fails with the same message.
#[derive(Debug, Clone)]
pub struct FailingHandler {
    error: String,
}

impl FailingHandler {
    /// Creates a new failing handler.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

#[async_trait]
impl Handler for FailingHandler {
    async fn call(&self, _ctx: &CallContext, _inputs: &[Values]) -> Result<Values> {
        Err(FlowError::msg(self.error.clone()))
    }
}

/// A handler that takes time before echoing its input.
#[derive(Debug)]
pub struct SlowHandler {
    delay: Duration,
    observe_context: bool,
    cancelled: AtomicUsize,
}

impl SlowHandler {
    /// Creates a slow handler that gives up when its context ends.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            observe_context: true,
            cancelled: AtomicUsize::new(0),
        }
    }

    /// Creates a slow handler that sleeps the full delay regardless of its context.
    #[must_use]
    pub fn ignoring_cancellation(delay: Duration) -> Self {
        Self {
            observe_context: false,
            ..Self::new(delay)
        }
    }

    /// Creates a slow handler with delay in milliseconds.
    #[must_use]
    pub fn with_delay_ms(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Returns how many calls ended early because the context ended.
    #[must_use]
    pub fn cancelled_count(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Handler for SlowHandler {
    async fn call(&self, ctx: &CallContext, inputs: &[Values]) -> Result<Values> {
        if !self.observe_context {
            tokio::time::sleep(self.delay).await;
            return Ok(Values::merged(inputs));
        }
        tokio::select! {
            () = tokio::time::sleep(self.delay) => Ok(Values::merged(inputs)),
            err = ctx.done() => {
                self.cancelled.fetch_add(1, Ordering::SeqCst);
                Err(err)
            }
        }
    }
}

#[derive(Debug, Default)]
struct ProbeState {
    active: AtomicUsize,
    peak: AtomicUsize,
    total: AtomicUsize,
}

/// Measures how many probe handlers run at the same time.
#[derive(Debug, Clone)]
pub struct ConcurrencyProbe {
    hold: Duration,
    state: Arc<ProbeState>,
}

impl ConcurrencyProbe {
    /// Creates a probe whose handlers stay busy for `hold`.
    #[must_use]
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            state: Arc::new(ProbeState::default()),
        }
    }

    /// Returns a handler reporting to this probe. It outputs `{key: "done"}`.
    #[must_use]
    pub fn handler(&self, key: impl Into<String>) -> ProbeHandler {
        ProbeHandler {
            key: key.into(),
            hold: self.hold,
            state: Arc::clone(&self.state),
        }
    }

    /// Returns the highest number of handlers seen running at once.
    #[must_use]
    pub fn peak(&self) -> usize {
        self.state.peak.load(Ordering::SeqCst)
    }

    /// Returns the number of handlers currently running.
    #[must_use]
    pub fn active(&self) -> usize {
        self.state.active.load(Ordering::SeqCst)
    }

    /// Returns the number of completed and running calls.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.state.total.load(Ordering::SeqCst)
    }
}

/// A handler created by [`ConcurrencyProbe::handler`].
#[derive(Debug, Clone)]
pub struct ProbeHandler {
    key: String,
    hold: Duration,
    state: Arc<ProbeState>,
}

#[async_trait]
impl Handler for ProbeHandler {
    async fn call(&self, _ctx: &CallContext, _inputs: &[Values]) -> Result<Values> {
        self.state.total.fetch_add(1, Ordering::SeqCst);
        let now = self.state.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.hold).await;
        self.state.active.fetch_sub(1, Ordering::SeqCst);
        Ok(Values::from([(self.key.clone(), "done")]))
    }
}
