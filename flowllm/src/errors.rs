//! Error types for flowllm handlers.
//!
//! Every handler returns [`FlowError`]. Collaborator failures are carried
//! through untouched so their message is what the caller sees; context
//! errors are distinct variants so callers can test for them directly.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = FlowError> = std::result::Result<T, E>;

/// The main error type for flowllm operations.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The call context was cancelled.
    #[error("context canceled")]
    Cancelled,

    /// The call context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,

    /// A value was missing or held a different kind than expected.
    #[error("value for key '{key}' is not {expected}: {found}")]
    TypeMismatch {
        /// The offending key.
        key: String,
        /// The kind that was expected.
        expected: &'static str,
        /// Description of what was found instead.
        found: String,
    },

    /// Memory only supports a single input value.
    #[error("input values have multiple keys, memory only supported when one key currently: {keys:?}")]
    AmbiguousInput {
        /// The keys that were present.
        keys: Vec<String>,
    },

    /// A template could not be built or rendered.
    #[error("Template error: {0}")]
    Template(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A branch task panicked or was aborted.
    #[error("Task join error: {0}")]
    Join(String),

    /// A failure reported by a handler or collaborator.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FlowError {
    /// Creates a collaborator error from a plain message.
    pub fn msg(message: impl std::fmt::Display + std::fmt::Debug + Send + Sync + 'static) -> Self {
        Self::Other(anyhow::Error::msg(message))
    }

    /// Creates a type mismatch error for a value expected to be text.
    #[must_use]
    pub fn not_text(key: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            key: key.into(),
            expected: "text",
            found: found.into(),
        }
    }

    /// Returns true for cancellation and deadline errors.
    #[must_use]
    pub const fn is_context_error(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}
