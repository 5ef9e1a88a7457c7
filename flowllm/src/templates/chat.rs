//! Chat prompt template.

use super::Template;
use crate::context::CallContext;
use crate::errors::{FlowError, Result};
use crate::handlers::Handler;
use crate::values::{ChatMessage, ChatMessages, Role, Value, Values, DEFAULT_CHAT_KEY, DEFAULT_KEY};
use async_trait::async_trait;

/// One entry of a [`ChatTemplate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageTemplate {
    /// A message rendered from a template.
    Message {
        /// Author of the rendered message.
        role: Role,
        /// Template for the message content.
        template: Template,
    },
    /// Replaced by the conversation history found under [`DEFAULT_CHAT_KEY`].
    HistoryPlaceholder,
}

impl MessageTemplate {
    /// A system message template.
    #[must_use]
    pub fn system(template: impl Into<Template>) -> Self {
        Self::message(Role::System, template)
    }

    /// A user message template.
    #[must_use]
    pub fn user(template: impl Into<Template>) -> Self {
        Self::message(Role::User, template)
    }

    /// An assistant message template.
    #[must_use]
    pub fn assistant(template: impl Into<Template>) -> Self {
        Self::message(Role::Assistant, template)
    }

    /// A message template with an explicit role.
    #[must_use]
    pub fn message(role: Role, template: impl Into<Template>) -> Self {
        Self::Message {
            role,
            template: template.into(),
        }
    }

    /// The position where the conversation history goes.
    #[must_use]
    pub const fn history_placeholder() -> Self {
        Self::HistoryPlaceholder
    }
}

/// A list of message templates rendered into a chat history.
///
/// The rendered messages are stored under [`DEFAULT_CHAT_KEY`], and a
/// `role: content` line per message under [`DEFAULT_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatTemplate {
    messages: Vec<MessageTemplate>,
}

impl ChatTemplate {
    /// Creates a chat template.
    #[must_use]
    pub fn new(messages: Vec<MessageTemplate>) -> Self {
        Self { messages }
    }

    /// Appends a message template.
    #[must_use]
    pub fn with_message(mut self, message: MessageTemplate) -> Self {
        self.messages.push(message);
        self
    }

    /// Renders the messages against `vals`.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Template` if the template has a history placeholder
    /// and [`DEFAULT_CHAT_KEY`] holds something other than chat messages.
    pub fn render(&self, vals: &Values) -> Result<ChatMessages> {
        let mut rendered = ChatMessages::new();
        for message in &self.messages {
            match message {
                MessageTemplate::Message { role, template } => {
                    rendered.push(ChatMessage::new(*role, template.render(vals)));
                }
                MessageTemplate::HistoryPlaceholder => match vals.value(DEFAULT_CHAT_KEY) {
                    Some(Value::Messages(history)) => rendered.extend(history.iter().cloned()),
                    Some(other) => {
                        return Err(FlowError::Template(format!(
                            "history placeholder expects chat messages under '{DEFAULT_CHAT_KEY}', found {}",
                            other.describe()
                        )))
                    }
                    None => {}
                },
            }
        }
        Ok(rendered)
    }
}

impl FromIterator<MessageTemplate> for ChatTemplate {
    fn from_iter<I: IntoIterator<Item = MessageTemplate>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[async_trait]
impl Handler for ChatTemplate {
    async fn call(&self, _ctx: &CallContext, inputs: &[Values]) -> Result<Values> {
        let vals = Values::merged(inputs);
        let messages = self.render(&vals)?;

        let text: String = messages.iter().map(|m| format!("{m}\n")).collect();
        Ok(vals.with(DEFAULT_KEY, text).with(DEFAULT_CHAT_KEY, messages))
    }
}
