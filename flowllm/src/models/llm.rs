//! Handlers over language models.

use super::{ChatLanguageModel, LanguageModel};
use crate::context::CallContext;
use crate::errors::Result;
use crate::handlers::Handler;
use crate::values::{ChatMessage, ChatMessages, Values, DEFAULT_CHAT_KEY, DEFAULT_KEY};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Sends the primary text to a [`LanguageModel`] and stores the completion
/// back under [`DEFAULT_KEY`].
///
/// If the call context ends first, the model call is dropped and the context
/// error is returned.
#[derive(Clone)]
pub struct Llm {
    model: Arc<dyn LanguageModel>,
}

impl Llm {
    /// Creates a handler over `model`.
    #[must_use]
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }
}

impl std::fmt::Debug for Llm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Llm").finish_non_exhaustive()
    }
}

#[async_trait]
impl Handler for Llm {
    async fn call(&self, ctx: &CallContext, inputs: &[Values]) -> Result<Values> {
        let vals = Values::merged(inputs);
        let prompt = vals.get(DEFAULT_KEY);
        debug!(run_id = %ctx.run_id(), prompt_len = prompt.len(), "Calling language model");
        let output = ctx
            .run_until_done(LanguageModel::call(self.model.as_ref(), ctx, &prompt))
            .await?;
        Ok(vals.with(DEFAULT_KEY, output))
    }
}

/// Sends a conversation to a [`ChatLanguageModel`].
///
/// The conversation is the history under [`DEFAULT_CHAT_KEY`] when it holds
/// any messages. Otherwise the primary text, if not empty, is sent as a
/// single user message. The reply is stored under [`DEFAULT_KEY`].
#[derive(Clone)]
pub struct ChatLlm {
    model: Arc<dyn ChatLanguageModel>,
}

impl ChatLlm {
    /// Creates a handler over `model`.
    #[must_use]
    pub fn new(model: Arc<dyn ChatLanguageModel>) -> Self {
        Self { model }
    }
}

impl std::fmt::Debug for ChatLlm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatLlm").finish_non_exhaustive()
    }
}

fn conversation(vals: &Values) -> ChatMessages {
    match vals.messages(DEFAULT_CHAT_KEY) {
        Ok(history) if !history.is_empty() => history.clone(),
        _ => {
            let text = vals.get(DEFAULT_KEY);
            if text.is_empty() {
                ChatMessages::new()
            } else {
                ChatMessages::from(vec![ChatMessage::user(text)])
            }
        }
    }
}

#[async_trait]
impl Handler for ChatLlm {
    async fn call(&self, ctx: &CallContext, inputs: &[Values]) -> Result<Values> {
        let vals = Values::merged(inputs);
        let messages = conversation(&vals);
        debug!(run_id = %ctx.run_id(), messages = messages.len(), "Calling chat model");
        let output = ctx
            .run_until_done(self.model.chat(ctx, messages.as_slice()))
            .await?;
        Ok(vals.with(DEFAULT_KEY, output))
    }
}
