//! Conversation memory and the handler that wires it around another handler.
//!
//! [`WithMemory`] loads the stored history, exposes it to the wrapped
//! handler under [`DEFAULT_CHAT_KEY`], then records the new exchange.

mod buffer;
mod history;
#[cfg(test)]
mod memory_tests;

pub use buffer::BufferMemory;
pub use history::ChatMessageHistory;

use crate::context::CallContext;
use crate::errors::{FlowError, Result};
use crate::handlers::{BoxedHandler, Handler};
use crate::values::{ChatMessages, Values, DEFAULT_CHAT_KEY, DEFAULT_KEY};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Storage for previous exchanges of a conversation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Memory: Send + Sync {
    /// Returns the stored conversation, oldest first.
    async fn load(&self, ctx: &CallContext) -> Result<ChatMessages>;

    /// Records one exchange: the user's input, then the assistant's output.
    async fn save(&self, ctx: &CallContext, input: &str, output: &str) -> Result<()>;
}

/// Wraps a handler with conversation memory.
///
/// The caller's input must be a single text value. The wrapped handler's
/// reply is read from [`DEFAULT_KEY`]. Any failure, including a load or save
/// failure, is returned as is and no output is produced.
#[derive(Clone)]
pub struct WithMemory {
    memory: Arc<dyn Memory>,
    inner: BoxedHandler,
}

impl WithMemory {
    /// Creates a memory wrapper around `inner`.
    #[must_use]
    pub fn new(memory: Arc<dyn Memory>, inner: impl Handler + 'static) -> Self {
        Self {
            memory,
            inner: Arc::new(inner),
        }
    }
}

impl std::fmt::Debug for WithMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WithMemory").finish_non_exhaustive()
    }
}

/// Returns the text of the only entry in `vals`.
fn single_text(vals: &Values) -> Result<&str> {
    if vals.len() != 1 {
        let mut keys = vals.keys();
        keys.sort();
        return Err(FlowError::AmbiguousInput { keys });
    }
    let (key, value) = vals
        .iter()
        .next()
        .ok_or_else(|| FlowError::AmbiguousInput { keys: Vec::new() })?;
    value
        .as_text()
        .ok_or_else(|| FlowError::not_text(key.clone(), value.describe()))
}

#[async_trait]
impl Handler for WithMemory {
    async fn call(&self, ctx: &CallContext, inputs: &[Values]) -> Result<Values> {
        let vals = Values::merged(inputs);
        let history = self.memory.load(ctx).await?;
        let input = single_text(&vals)?.to_string();

        debug!(run_id = %ctx.run_id(), history = history.len(), "Loaded memory");
        let augmented = vals.clone().with(DEFAULT_CHAT_KEY, history);
        let out = self.inner.call(ctx, &[augmented]).await?;

        let output = out.text(DEFAULT_KEY)?;
        self.memory.save(ctx, &input, output).await?;
        Ok(vals.merge([&out]))
    }
}
