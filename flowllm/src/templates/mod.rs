//! Prompt templates.
//!
//! A [`Template`] replaces `{name}` placeholders with values from its input.
//! A [`ChatTemplate`] renders a list of role-tagged message templates and can
//! splice the conversation history in at a chosen position.

mod chat;
mod text;

pub use chat::{ChatTemplate, MessageTemplate};
pub use text::Template;
