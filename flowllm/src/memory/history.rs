//! In-process chat history.

use crate::values::{ChatMessage, ChatMessages};

/// An append-only list of chat messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatMessageHistory {
    messages: ChatMessages,
}

impl ChatMessageHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the stored messages.
    #[must_use]
    pub fn messages(&self) -> ChatMessages {
        self.messages.clone()
    }

    /// Appends a user message.
    pub fn add_user_message(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    /// Appends an assistant message.
    pub fn add_assistant_message(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    /// Removes every message.
    pub fn clear(&mut self) {
        self.messages = ChatMessages::new();
    }

    /// Returns the number of stored messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl From<ChatMessages> for ChatMessageHistory {
    fn from(messages: ChatMessages) -> Self {
        Self { messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Role;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_add_messages_in_order() {
        let mut history = ChatMessageHistory::new();
        history.add_user_message("hello");
        history.add_assistant_message("hi there");

        let messages = history.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages.as_slice()[0], ChatMessage::new(Role::User, "hello"));
        assert_eq!(messages.as_slice()[1], ChatMessage::new(Role::Assistant, "hi there"));
    }

    #[test]
    fn test_messages_returns_copy() {
        let mut history = ChatMessageHistory::new();
        history.add_user_message("one");

        let mut copy = history.messages();
        copy.push(ChatMessage::user("not stored"));

        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut history = ChatMessageHistory::from(ChatMessages::from(vec![ChatMessage::user("x")]));
        assert!(!history.is_empty());
        history.clear();
        assert!(history.is_empty());
        assert!(history.messages().is_empty());
    }
}
