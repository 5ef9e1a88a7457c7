//! # flowllm
//!
//! Composable handler pipelines for language-model applications.
//!
//! Every unit of work is a [`Handler`](handlers::Handler): it receives one or
//! more [`Values`](values::Values) bags, merges them, and returns a new bag.
//! Handlers compose with:
//!
//! - **Chain**: run handlers in order, feeding each the previous output
//! - **`ParallelChain`**: run branches concurrently under a worker bound and
//!   merge their outputs
//! - **`WithMemory`**: load a conversation history before a handler runs and
//!   record the new exchange after it succeeds
//!
//! Prompt templates, model adapters and small text transforms are handlers
//! too, so a whole application is one composite handler called with a
//! cancellable, deadline-bearing [`CallContext`](context::CallContext).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowllm::prelude::*;
//!
//! let chain = Chain::new()
//!     .then(
//!         ParallelChain::new(2)
//!             .branch(Chain::new().then(Template::new("Name a {product} company.")).then(Llm::new(model.clone())).then(MapOutputTo::new("name")))
//!             .branch(Chain::new().then(Template::new("Write a {product} slogan.")).then(Llm::new(model)).then(MapOutputTo::new("slogan"))),
//!     )
//!     .then(TrimSpace::new(["name", "slogan"]));
//!
//! let ctx = CallContext::background().with_timeout(Duration::from_secs(30));
//! let out = chain.call(&ctx, &[Values::from([("product", "socks")])]).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod chains;
pub mod config;
pub mod context;
pub mod errors;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod observability;
pub mod templates;
pub mod testing;
pub mod values;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::{BoundedTaskGroup, CancellationToken};
    pub use crate::chains::{Chain, ParallelChain};
    pub use crate::config::{EngineConfig, LoggingConfig};
    pub use crate::context::CallContext;
    pub use crate::errors::{FlowError, Result};
    pub use crate::handlers::{
        async_handler_fn, handler_fn, BoxedHandler, Handler, MapOutputTo, TrimSpace, TrimSuffix,
    };
    pub use crate::memory::{BufferMemory, ChatMessageHistory, Memory, WithMemory};
    pub use crate::models::{ChatLanguageModel, ChatLlm, Embeddings, LanguageModel, Llm};
    pub use crate::observability::init_tracing;
    pub use crate::templates::{ChatTemplate, MessageTemplate, Template};
    pub use crate::values::{
        ChatMessage, ChatMessages, Role, Value, Values, DEFAULT_CHAT_KEY, DEFAULT_KEY,
    };
}
