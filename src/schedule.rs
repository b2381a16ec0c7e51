//! Deferred work: timers and local tasks.
//!
//! Throttled commits and asynchronous validations continue later on the same
//! thread. A [`Scheduler`] supplies both kinds of continuation;
//! [`TokioScheduler`] runs them on a tokio `LocalSet`, and
//! [`ManualScheduler`](crate::testing::ManualScheduler) runs them under a
//! virtual clock for tests.

use std::time::Duration;

use futures::future::LocalBoxFuture;

/// Runs deferred work on the current thread.
pub trait Scheduler {
    /// Run `task` once `delay` has elapsed. There is no cancellation; a task
    /// that has become stale must detect it itself.
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>);

    /// Drive `task` to completion in the background.
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

/// Scheduler backed by tokio's current-thread machinery.
///
/// Uses [`tokio::task::spawn_local`], so every call must happen inside a
/// [`tokio::task::LocalSet`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        tokio::task::spawn_local(task);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
