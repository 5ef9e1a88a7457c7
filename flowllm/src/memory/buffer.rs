//! Windowed buffer memory.

use super::{ChatMessageHistory, Memory};
use crate::config::EngineConfig;
use crate::context::CallContext;
use crate::errors::Result;
use crate::values::ChatMessages;
use async_trait::async_trait;
use parking_lot::RwLock;

/// A [`Memory`] that keeps the conversation in process.
///
/// With a non-zero window, `load` returns only the last `window` exchanges
/// (`2 * window` messages). Saving always appends; nothing is evicted.
#[derive(Debug, Default)]
pub struct BufferMemory {
    history: RwLock<ChatMessageHistory>,
    window: usize,
}

impl BufferMemory {
    /// Creates a buffer, optionally seeded with earlier messages.
    #[must_use]
    pub fn new(window: usize, history: Option<ChatMessages>) -> Self {
        Self {
            history: RwLock::new(history.map(ChatMessageHistory::from).unwrap_or_default()),
            window,
        }
    }

    /// Creates an empty buffer using the configured window.
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.memory_window, None)
    }

    /// Returns the window size in exchanges; 0 means unbounded.
    #[must_use]
    pub const fn window(&self) -> usize {
        self.window
    }

    /// Drops the stored conversation.
    pub fn clear(&self) {
        self.history.write().clear();
    }
}

#[async_trait]
impl Memory for BufferMemory {
    async fn load(&self, _ctx: &CallContext) -> Result<ChatMessages> {
        let messages = self.history.read().messages();
        if self.window > 0 {
            return Ok(messages.last(self.window * 2));
        }
        Ok(messages)
    }

    async fn save(&self, _ctx: &CallContext, input: &str, output: &str) -> Result<()> {
        let mut history = self.history.write();
        history.add_user_message(input);
        history.add_assistant_message(output);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::{ChatMessage, Role};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_save_appends_user_then_assistant() {
        let ctx = CallContext::background();
        let buffer = BufferMemory::new(0, None);
        buffer.save(&ctx, "User input message", "Assistant output message").await.unwrap();

        let messages = buffer.load(&ctx).await.unwrap();
        assert_eq!(
            messages.into_vec(),
            vec![
                ChatMessage::new(Role::User, "User input message"),
                ChatMessage::new(Role::Assistant, "Assistant output message"),
            ]
        );
    }

    #[tokio::test]
    async fn test_seeded_history() {
        let ctx = CallContext::background();
        let seed = ChatMessages::from(vec![
            ChatMessage::user("User input message 0"),
            ChatMessage::assistant("Assistant output message 0"),
        ]);
        let buffer = BufferMemory::new(0, Some(seed));
        buffer.save(&ctx, "User input message 1", "Assistant output message 1").await.unwrap();

        let contents: Vec<_> = buffer
            .load(&ctx)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(
            contents,
            vec![
                "User input message 0",
                "Assistant output message 0",
                "User input message 1",
                "Assistant output message 1",
            ]
        );
    }

    #[tokio::test]
    async fn test_window_truncates_load() {
        let ctx = CallContext::background();
        let buffer = BufferMemory::new(2, None);
        for i in 1..=3 {
            buffer
                .save(&ctx, &format!("User message {i}"), &format!("Assistant message {i}"))
                .await
                .unwrap();
        }

        let contents: Vec<_> = buffer
            .load(&ctx)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(
            contents,
            vec!["User message 2", "Assistant message 2", "User message 3", "Assistant message 3"]
        );
    }

    #[tokio::test]
    async fn test_from_config_and_clear() {
        let ctx = CallContext::background();
        let buffer = BufferMemory::from_config(&EngineConfig::default().with_memory_window(1));
        assert_eq!(buffer.window(), 1);

        buffer.save(&ctx, "q", "a").await.unwrap();
        buffer.clear();
        assert!(buffer.load(&ctx).await.unwrap().is_empty());
    }
}
