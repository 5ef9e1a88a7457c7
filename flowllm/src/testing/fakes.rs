//! In-memory fakes for collaborator traits.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::context::CallContext;
use crate::errors::{FlowError, Result};
use crate::memory::Memory;
use crate::values::{ChatMessage, ChatMessages};

/// A [`Memory`] that records every saved exchange and can be told to fail.
#[derive(Debug, Default)]
pub struct FakeMemory {
    history: Mutex<ChatMessages>,
    saved: Mutex<Vec<(String, String)>>,
    load_error: Option<String>,
    save_error: Option<String>,
}

impl FakeMemory {
    /// Creates an empty fake memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fake memory that starts with `history`.
    #[must_use]
    pub fn with_history(history: ChatMessages) -> Self {
        Self {
            history: Mutex::new(history),
            ..Self::default()
        }
    }

    /// Makes every `load` fail with `error`.
    #[must_use]
    pub fn failing_load(mut self, error: impl Into<String>) -> Self {
        self.load_error = Some(error.into());
        self
    }

    /// Makes every `save` fail with `error`.
    #[must_use]
    pub fn failing_save(mut self, error: impl Into<String>) -> Self {
        self.save_error = Some(error.into());
        self
    }

    /// Returns every saved `(input, output)` pair, oldest first.
    #[must_use]
    pub fn saved(&self) -> Vec<(String, String)> {
        self.saved.lock().clone()
    }
}

#[async_trait]
impl Memory for FakeMemory {
    async fn load(&self, _ctx: &CallContext) -> Result<ChatMessages> {
        if let Some(error) = &self.load_error {
            return Err(FlowError::msg(error.clone()));
        }
        Ok(self.history.lock().clone())
    }

    async fn save(&self, _ctx: &CallContext, input: &str, output: &str) -> Result<()> {
        if let Some(error) = &self.save_error {
            return Err(FlowError::msg(error.clone()));
        }
        let mut history = self.history.lock();
        history.push(ChatMessage::user(input));
        history.push(ChatMessage::assistant(output));
        self.saved.lock().push((input.to_string(), output.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_fake_memory_records_saves() {
        let ctx = CallContext::background();
        let memory = FakeMemory::new();
        memory.save(&ctx, "q", "a").await.unwrap();

        assert_eq!(memory.saved(), vec![("q".to_string(), "a".to_string())]);
        assert_eq!(memory.load(&ctx).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fake_memory_failures() {
        let ctx = CallContext::background();
        let memory = FakeMemory::new().failing_load("no load").failing_save("no save");

        assert_eq!(memory.load(&ctx).await.unwrap_err().to_string(), "no load");
        assert_eq!(memory.save(&ctx, "q", "a").await.unwrap_err().to_string(), "no save");
        assert!(memory.saved().is_empty());
    }
}
