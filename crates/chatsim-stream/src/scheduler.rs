//! Schedule-and-cancel abstraction.
//!
//! The emitter only ever asks for "run this once after `delay`" and keeps the
//! returned handle so it can cancel. [`TokioScheduler`] backs this with a
//! spawned sleep; [`ManualScheduler`] keeps a virtual clock that tests move
//! forward explicitly.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

/// A one-shot unit of work run by a scheduler.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a pending task. Cancelling a task that already ran is a no-op.
pub trait TimerHandle: Send + Sync {
    fn cancel(&self);
}

/// Runs tasks once after a delay.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, task: Task) -> Box<dyn TimerHandle>;
}

/// Scheduler backed by the tokio runtime timer.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Scheduler on the runtime of the calling context, if there is one.
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }
}

struct TokioTimer {
    abort: AbortHandle,
}

impl TimerHandle for TokioTimer {
    fn cancel(&self) {
        self.abort.abort();
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> Box<dyn TimerHandle> {
        let join = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        Box::new(TokioTimer {
            abort: join.abort_handle(),
        })
    }
}

/// Virtual-clock scheduler. Nothing runs until [`ManualScheduler::advance`].
///
/// Clones share the same clock and queue.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Arc<Mutex<ManualState>>,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    // (due, id) keeps same-instant tasks in scheduling order
    pending: BTreeMap<(Duration, u64), Task>,
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &state.now)
            .field("pending", &state.pending.len())
            .finish()
    }
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    pub fn pending(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Move the clock forward by `by`, running every task that falls due in
    /// order. Tasks scheduled while advancing run too if they fall inside
    /// the window. Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.state.lock().now + by;
        let mut ran = 0;
        loop {
            let task = {
                let mut state = self.state.lock();
                let due = match state.pending.keys().next() {
                    Some(key) if key.0 <= target => *key,
                    _ => break,
                };
                state.now = due.0;
                state.pending.remove(&due)
            };
            // Run outside the lock so the task can schedule or cancel.
            if let Some(task) = task {
                task();
                ran += 1;
            }
        }
        self.state.lock().now = target;
        ran
    }
}

struct ManualTimer {
    key: (Duration, u64),
    state: Arc<Mutex<ManualState>>,
}

impl TimerHandle for ManualTimer {
    fn cancel(&self) {
        self.state.lock().pending.remove(&self.key);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> Box<dyn TimerHandle> {
        let mut state = self.state.lock();
        let key = (state.now + delay, state.next_id);
        state.next_id += 1;
        state.pending.insert(key, task);
        Box::new(ManualTimer {
            key,
            state: Arc::clone(&self.state),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter_task(counter: &Arc<AtomicUsize>) -> Task {
        let counter = Arc::clone(counter);
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_manual_runs_due_tasks_in_order() {
        let scheduler = ManualScheduler::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for (label, ms) in [("b", 200u64), ("a", 100), ("c", 200)] {
            let order = Arc::clone(&order);
            scheduler.schedule(
                Duration::from_millis(ms),
                Box::new(move || order.lock().push(label)),
            );
        }

        assert_eq!(scheduler.advance(Duration::from_millis(99)), 0);
        assert_eq!(scheduler.advance(Duration::from_millis(101)), 3);
        assert_eq!(*order.lock(), vec!["a", "b", "c"]);
        assert_eq!(scheduler.now(), Duration::from_millis(200));
    }

    #[test]
    fn test_manual_cancel() {
        let scheduler = ManualScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = scheduler.schedule(Duration::from_millis(10), counter_task(&counter));
        handle.cancel();
        assert_eq!(scheduler.pending(), 0);
        scheduler.advance(Duration::from_secs(1));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        // cancelling again is harmless
        handle.cancel();
    }

    #[test]
    fn test_manual_task_can_reschedule() {
        let scheduler = ManualScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let inner = scheduler.clone();
        let inner_counter = Arc::clone(&counter);
        scheduler.schedule(
            Duration::from_millis(10),
            Box::new(move || {
                inner.schedule(Duration::from_millis(10), counter_task(&inner_counter));
            }),
        );
        assert_eq!(scheduler.advance(Duration::from_millis(25)), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_fires_and_cancels() {
        let scheduler = TokioScheduler::try_current().unwrap();
        let fired = Arc::new(AtomicUsize::new(0));
        let cancelled = Arc::new(AtomicUsize::new(0));

        scheduler.schedule(Duration::from_millis(100), counter_task(&fired));
        let handle = scheduler.schedule(Duration::from_millis(100), counter_task(&cancelled));
        handle.cancel();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(cancelled.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_try_current_outside_runtime() {
        assert!(TokioScheduler::try_current().is_none());
    }
}
