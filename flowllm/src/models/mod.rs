//! Model collaborator traits and the handlers that put them in a chain.
//!
//! Concrete clients live outside this crate; they only need to implement
//! [`LanguageModel`], [`ChatLanguageModel`] or [`Embeddings`].

mod llm;

pub use llm::{ChatLlm, Llm};

use crate::context::CallContext;
use crate::errors::Result;
use crate::values::ChatMessage;
use async_trait::async_trait;

/// A text-completion model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Completes `prompt`.
    async fn call(&self, ctx: &CallContext, prompt: &str) -> Result<String>;
}

/// A chat model.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatLanguageModel: Send + Sync {
    /// Returns the assistant's reply to `messages`, oldest first.
    async fn chat(&self, ctx: &CallContext, messages: &[ChatMessage]) -> Result<String>;
}

/// Produces numerical representations of text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Embeddings: Send + Sync {
    /// Returns the embedding for one string.
    async fn embed_string(&self, ctx: &CallContext, text: &str) -> Result<Vec<f32>>;

    /// Returns one embedding per input string, in input order.
    async fn embed_strings(&self, ctx: &CallContext, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
