//! Cancellation token for cooperative cancellation.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// A token for cooperative cancellation.
///
/// Cancellation is idempotent - only the first cancellation reason is kept.
/// Child tokens observe their parent's cancellation but never cancel it.
#[derive(Default)]
pub struct CancellationToken {
    /// Whether cancellation has been requested.
    cancelled: AtomicBool,
    /// The reason for cancellation (first one wins).
    reason: RwLock<Option<String>>,
    /// Wakes tasks waiting in `cancelled()`.
    notify: Notify,
    /// The token this one was derived from.
    parent: Option<Arc<CancellationToken>>,
}

impl CancellationToken {
    /// Creates a new cancellation token.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a token that reports cancelled whenever `self` is.
    ///
    /// Cancelling the child leaves `self` untouched.
    #[must_use]
    pub fn child(self: &Arc<Self>) -> Arc<Self> {
        Arc::new(Self {
            parent: Some(Arc::clone(self)),
            ..Self::default()
        })
    }

    /// Requests cancellation with a reason and wakes every waiter.
    ///
    /// This is idempotent - only the first reason is kept.
    pub fn cancel(&self, reason: impl Into<String>) {
        if self
            .cancelled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            *self.reason.write() = Some(reason.into());
            self.notify.notify_waiters();
        }
    }

    /// Returns whether cancellation has been requested here or on an ancestor.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.parent.as_ref().is_some_and(|p| p.is_cancelled())
    }

    /// Returns the cancellation reason, if any. A token's own reason wins over
    /// an ancestor's.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason
            .read()
            .clone()
            .or_else(|| self.parent.as_ref().and_then(|p| p.reason()))
    }

    /// Waits until this token or any ancestor is cancelled.
    pub async fn cancelled(&self) {
        loop {
            let mut waits = Vec::new();
            let mut current = Some(self);
            while let Some(token) = current {
                waits.push(Box::pin(token.notify.notified()));
                current = token.parent.as_deref();
            }
            if self.is_cancelled() {
                return;
            }
            futures::future::select_all(waits).await;
        }
    }

    /// Returns a guard that cancels the token when dropped.
    #[must_use]
    pub fn drop_guard(self: &Arc<Self>, reason: impl Into<String>) -> CancelOnDrop {
        CancelOnDrop {
            token: Arc::clone(self),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("reason", &self.reason())
            .finish()
    }
}

/// Cancels its token when dropped.
#[derive(Debug)]
pub struct CancelOnDrop {
    token: Arc<CancellationToken>,
    reason: String,
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.token.cancel(std::mem::take(&mut self.reason));
    }
}
