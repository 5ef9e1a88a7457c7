//! Cancellable, deadline-bearing call context.

use crate::cancellation::CancellationToken;
use crate::errors::{FlowError, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

/// The context a handler runs under.
///
/// Cloning is cheap and shares the same token. Derived contexts (`child`,
/// `with_timeout`, `with_deadline`) are cancelled with their parent and
/// inherit its deadline, but cancelling them never affects the parent.
#[derive(Debug, Clone)]
pub struct CallContext {
    token: Arc<CancellationToken>,
    deadline: Option<Instant>,
    run_id: Uuid,
}

impl CallContext {
    /// Creates a root context that is never cancelled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
            run_id: Uuid::new_v4(),
        }
    }

    /// Creates a child context with its own cancellation token.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child(),
            deadline: self.deadline,
            run_id: self.run_id,
        }
    }

    /// Creates a child context that expires after `timeout`.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Creates a child context that expires at `deadline`, or at the parent's
    /// deadline if that comes first.
    #[must_use]
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let mut ctx = self.child();
        ctx.deadline = Some(self.deadline.map_or(deadline, |d| d.min(deadline)));
        ctx
    }

    /// Cancels this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel("context cancelled");
    }

    /// Returns the cancellation token.
    #[must_use]
    pub fn token(&self) -> &Arc<CancellationToken> {
        &self.token
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the run identifier shared by the whole call tree.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns why the context ended, or `None` while it is still live.
    #[must_use]
    pub fn err(&self) -> Option<FlowError> {
        if self.token.is_cancelled() {
            Some(FlowError::Cancelled)
        } else if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some(FlowError::DeadlineExceeded)
        } else {
            None
        }
    }

    /// Returns true once the context is cancelled or past its deadline.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Waits until the context ends and returns the reason.
    pub async fn done(&self) -> FlowError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                () = self.token.cancelled() => FlowError::Cancelled,
                () = tokio::time::sleep_until(deadline) => FlowError::DeadlineExceeded,
            },
            None => {
                self.token.cancelled().await;
                FlowError::Cancelled
            }
        }
    }

    /// Runs `fut` until it completes or the context ends, whichever is first.
    ///
    /// # Errors
    ///
    /// Returns the context error if the context ends first, otherwise the
    /// future's own result.
    pub async fn run_until_done<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            res = fut => res,
        }
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::background()
    }
}
