//! ManualScheduler: deterministic timers and tasks for tests.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::time::Duration;

use futures::executor::{LocalPool, LocalSpawner};
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;

use crate::schedule::Scheduler;

struct Timer {
    due: Duration,
    seq: u64,
    task: Box<dyn FnOnce()>,
}

/// A [`Scheduler`] driven by hand.
///
/// Time only moves when [`advance`](Self::advance) is called; spawned tasks
/// only run inside `advance`, [`run_until_stalled`](Self::run_until_stalled)
/// or [`block_on`](Self::block_on).
///
/// # Examples
///
/// ```ignore
/// let scheduler = Rc::new(ManualScheduler::new());
/// let binder = Binder::new(scheduler.clone());
/// // ... push into a throttled binding ...
/// scheduler.advance(Duration::from_millis(300));
/// ```
pub struct ManualScheduler {
    now: Cell<Duration>,
    next_seq: Cell<u64>,
    timers: RefCell<Vec<Timer>>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
}

impl ManualScheduler {
    /// Create a scheduler at virtual time zero.
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            now: Cell::new(Duration::ZERO),
            next_seq: Cell::new(0),
            timers: RefCell::new(Vec::new()),
            pool: RefCell::new(pool),
            spawner,
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// Number of timers that have not fired yet.
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    /// Move the clock forward, firing due timers in deadline order and running
    /// spawned tasks after each one.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        while let Some(timer) = self.take_due(target) {
            self.now.set(timer.due);
            (timer.task)();
            self.run_until_stalled();
        }
        self.now.set(target);
        self.run_until_stalled();
    }

    /// Run spawned tasks until none can make progress.
    pub fn run_until_stalled(&self) {
        self.pool.borrow_mut().run_until_stalled();
    }

    /// Run `future` to completion, driving spawned tasks alongside it.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.pool.borrow_mut().run_until(future)
    }

    fn take_due(&self, target: Duration) -> Option<Timer> {
        let mut timers = self.timers.borrow_mut();
        let index = timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= target)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(i, _)| i)?;
        Some(timers.remove(index))
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.timers.borrow_mut().push(Timer {
            due: self.now.get() + delay,
            seq,
            task,
        });
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(err) = self.spawner.spawn_local(task) {
            tracing::warn!(%err, "manual scheduler could not spawn task");
        }
    }
}
