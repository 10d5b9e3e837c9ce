//! Deferred callbacks with cancellable handles
//!
//! Every fixed-delay cleanup in the crate (notification fade-out, object URL release,
//! overlay auto-close) goes through [`Scheduler::schedule`]. Callbacks run on the Tokio
//! runtime after the delay elapses, so tests can drive them with a paused clock
//! (`#[tokio::test(start_paused = true)]`).
//!
//! A cancelled callback is dropped without running. Values captured by the callback are
//! dropped with it, which is how element guards still clean up on cancellation.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Spawns delayed callbacks that can be cancelled individually or all at once
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    root: CancellationToken,
    tracker: TaskTracker,
}

impl Scheduler {
    /// Create a new scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once `delay` has elapsed
    ///
    /// Must be called from within a Tokio runtime. Dropping the returned handle does not
    /// cancel the callback.
    pub fn schedule<F>(&self, delay: Duration, task: F) -> ScheduledTask
    where
        F: FnOnce() + Send + 'static,
    {
        let token = self.root.child_token();
        let cancelled = token.clone();

        let handle = self.tracker.spawn(async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => {
                    tracing::debug!(delay_ms = delay.as_millis() as u64, "scheduled callback cancelled");
                    false
                }
                _ = tokio::time::sleep(delay) => {
                    task();
                    true
                }
            }
        });

        ScheduledTask { token, handle }
    }

    /// Cancel every pending callback scheduled through this scheduler (or its clones)
    pub fn cancel_all(&self) {
        self.root.cancel();
    }

    /// Whether [`cancel_all`](Self::cancel_all) has been called
    pub fn is_cancelled(&self) -> bool {
        self.root.is_cancelled()
    }

    /// Number of callbacks that have not settled yet
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Wait until every callback (including ones scheduled by running callbacks) settles
    pub async fn settled(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}

/// Handle to one scheduled callback
#[derive(Debug)]
pub struct ScheduledTask {
    token: CancellationToken,
    handle: JoinHandle<bool>,
}

impl ScheduledTask {
    /// Cancel the callback if it has not run yet
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait until the callback settles; returns `true` if it ran
    pub async fn wait(self) -> bool {
        self.handle.await.unwrap_or(false)
    }
}
