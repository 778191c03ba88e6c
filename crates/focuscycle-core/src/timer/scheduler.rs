//! Repeating tick sources for the timer.
//!
//! A scheduler owns at most one repeating task. Arming it again replaces the
//! previous task, and every task is stamped with the generation the timer
//! handed it, so a tick that was already queued when its task got cancelled
//! is recognisable as stale.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Period of a countdown tick.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One tick from the task armed with `generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

pub trait TickScheduler {
    /// Start a repeating task, cancelling any task already armed.
    fn arm(&mut self, generation: u64, period: Duration);

    /// Cancel the armed task. No-op when nothing is armed.
    fn cancel(&mut self);

    fn is_armed(&self) -> bool;
}

/// Tokio-backed scheduler delivering ticks over an mpsc channel.
///
/// Arming spawns onto the current tokio runtime, so it must happen inside
/// one. Dropping the scheduler aborts the armed task.
#[derive(Debug)]
pub struct IntervalScheduler {
    tx: mpsc::UnboundedSender<Tick>,
    task: Option<JoinHandle<()>>,
}

impl IntervalScheduler {
    /// Create a scheduler and the receiving end its ticks arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, task: None }, rx)
    }
}

impl TickScheduler for IntervalScheduler {
    fn arm(&mut self, generation: u64, period: Duration) {
        self.cancel();
        let tx = self.tx.clone();
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(Tick { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_armed(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Scheduler with no clock of its own: ticks are pulled with
/// [`ManualScheduler::next_tick`] and fed to the timer by the caller.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    armed: Option<u64>,
    arm_count: usize,
    cancel_count: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The tick the armed task would deliver next, if one is armed.
    pub fn next_tick(&self) -> Option<Tick> {
        self.armed.map(|generation| Tick { generation })
    }

    /// Number of times a task has been armed.
    pub fn arm_count(&self) -> usize {
        self.arm_count
    }

    /// Number of times an armed task has been cancelled.
    pub fn cancel_count(&self) -> usize {
        self.cancel_count
    }
}

impl TickScheduler for ManualScheduler {
    fn arm(&mut self, generation: u64, _period: Duration) {
        self.cancel();
        self.armed = Some(generation);
        self.arm_count += 1;
    }

    fn cancel(&mut self) {
        if self.armed.take().is_some() {
            self.cancel_count += 1;
        }
    }

    fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}
