//! Recurring background task that stops re-arming once it reports `Done`

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::Instrument;

/// Result of one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick<T> {
    /// Schedule another tick after the interval
    Continue,
    /// Terminal; no further ticks run
    Done(T),
}

/// Work executed on every tick of a [`RecurringTask`]
#[async_trait]
pub trait Recurring: Send + 'static {
    type Output: Send + 'static;

    async fn tick(&mut self) -> Tick<Self::Output>;
}

/// Handle to a spawned recurring task
#[derive(Debug)]
pub struct TaskHandle {
    ticks: Arc<AtomicU64>,
    join: JoinHandle<()>,
}

impl TaskHandle {
    /// Ticks started so far
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait until the task has reported `Done` and its handler returned
    pub async fn join(self) {
        if let Err(err) = self.join.await {
            tracing::error!(error = %err, "recurring task terminated abnormally");
        }
    }
}

pub struct RecurringTask;

impl RecurringTask {
    /// Spawn `task` on the current tokio runtime.
    ///
    /// The first tick fires immediately, later ones every `interval` after
    /// the previous tick started. A tick never overlaps the previous one;
    /// a slow tick delays the schedule instead of bursting. `on_done` runs
    /// exactly once, with the value of the first `Tick::Done`.
    pub fn spawn<R, D>(interval: Duration, mut task: R, on_done: D) -> TaskHandle
    where
        R: Recurring,
        D: FnOnce(R::Output) + Send + 'static,
    {
        let period = interval.max(Duration::from_millis(1));
        let ticks = Arc::new(AtomicU64::new(0));
        let counter = ticks.clone();

        let join = tokio::spawn(
            async move {
                let mut timer = tokio::time::interval(period);
                timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

                loop {
                    timer.tick().await;
                    counter.fetch_add(1, Ordering::SeqCst);

                    if let Tick::Done(output) = task.tick().await {
                        on_done(output);
                        break;
                    }
                }
            }
            .in_current_span(),
        );

        TaskHandle { ticks, join }
    }
}
