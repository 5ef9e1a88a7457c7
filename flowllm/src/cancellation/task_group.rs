//! Bounded task group for running a batch of jobs on a fixed worker set.

use super::CancellationToken;
use crate::errors::{FlowError, Result};
use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// A fixed-size set of workers pulling jobs from a shared queue.
///
/// At most `max_workers` jobs run at once. A worker stops pulling work once
/// the group's token is cancelled or after its own job fails. Workers are
/// detached: cancelling the token notifies running jobs, it never aborts them.
pub struct BoundedTaskGroup {
    /// Upper bound on concurrently running jobs.
    max_workers: usize,
    /// The cancellation token shared with every job.
    cancel_token: Arc<CancellationToken>,
}

impl BoundedTaskGroup {
    /// Creates a new task group. A bound of zero is treated as one.
    #[must_use]
    pub fn new(max_workers: usize, cancel_token: Arc<CancellationToken>) -> Self {
        Self {
            max_workers: max_workers.max(1),
            cancel_token,
        }
    }

    /// Returns the worker bound.
    #[must_use]
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Cancels all jobs in the group.
    pub fn cancel_all(&self, reason: &str) {
        self.cancel_token.cancel(reason);
    }

    /// Starts running `jobs` and returns the channel their results arrive on,
    /// in completion order.
    ///
    /// The channel closes once every worker has exited. A panicking job is
    /// reported as `FlowError::Join`.
    pub fn spawn_all<J, T, F, Fut>(&self, jobs: Vec<J>, task: F) -> mpsc::UnboundedReceiver<Result<T>>
    where
        J: Send + 'static,
        T: Send + 'static,
        F: Fn(J) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let workers = self.max_workers.min(jobs.len());
        let queue = Arc::new(Mutex::new(VecDeque::from(jobs)));
        let task = Arc::new(task);

        for worker in 0..workers {
            let queue = Arc::clone(&queue);
            let task = Arc::clone(&task);
            let token = Arc::clone(&self.cancel_token);
            let tx = tx.clone();

            tokio::spawn(async move {
                loop {
                    if token.is_cancelled() {
                        debug!(worker, "Worker observed cancellation");
                        break;
                    }
                    let next = queue.lock().pop_front();
                    let Some(job) = next else {
                        break;
                    };

                    let result = match AssertUnwindSafe(task(job)).catch_unwind().await {
                        Ok(result) => result,
                        Err(panic) => {
                            let msg = panic_message(panic.as_ref());
                            error!(worker, error = %msg, "Job panicked");
                            Err(FlowError::Join(msg))
                        }
                    };

                    let failed = result.is_err();
                    if tx.send(result).is_err() || failed {
                        break;
                    }
                }
            });
        }

        rx
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "job panicked".to_string())
}

impl std::fmt::Debug for BoundedTaskGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedTaskGroup")
            .field("max_workers", &self.max_workers)
            .field("cancelled", &self.cancel_token.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    async fn collect<T>(mut rx: mpsc::UnboundedReceiver<Result<T>>) -> Vec<Result<T>> {
        let mut out = Vec::new();
        while let Some(r) = rx.recv().await {
            out.push(r);
        }
        out
    }

    #[tokio::test]
    async fn test_all_jobs_complete() {
        let group = BoundedTaskGroup::new(2, CancellationToken::new());
        let rx = group.spawn_all(vec![1, 2, 3, 4], |n| async move { Ok(n * 10) });

        let mut results: Vec<_> = collect(rx).await.into_iter().map(|r| r.unwrap()).collect();
        results.sort_unstable();
        assert_eq!(results, vec![10, 20, 30, 40]);
    }

    #[tokio::test]
    async fn test_zero_bound_is_one() {
        let group = BoundedTaskGroup::new(0, CancellationToken::new());
        assert_eq!(group.max_workers(), 1);
        let rx = group.spawn_all(vec![(), ()], |()| async { Ok(()) });
        assert_eq!(collect(rx).await.len(), 2);
    }

    #[tokio::test]
    async fn test_bound_respected() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let group = BoundedTaskGroup::new(3, CancellationToken::new());

        let rx = {
            let active = active.clone();
            let peak = peak.clone();
            group.spawn_all((0..10).collect(), move |_n: usize| {
                let active = active.clone();
                let peak = peak.clone();
                async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                    Ok(())
                }
            })
        };

        assert_eq!(collect(rx).await.len(), 10);
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_cancelled_group_stops_pulling() {
        let group = BoundedTaskGroup::new(1, CancellationToken::new());
        group.cancel_all("Manual cancel");

        let rx = group.spawn_all(vec![1, 2, 3], |n| async move { Ok(n) });
        assert!(collect(rx).await.is_empty());
    }

    #[tokio::test]
    async fn test_panic_reported_as_join_error() {
        let group = BoundedTaskGroup::new(1, CancellationToken::new());
        let rx = group.spawn_all(vec![()], |()| async {
            if true {
                panic!("boom");
            }
            Ok(())
        });

        let results = collect(rx).await;
        assert_eq!(results.len(), 1);
        assert!(matches!(&results[0], Err(FlowError::Join(msg)) if msg == "boom"));
    }
}
