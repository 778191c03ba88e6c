//! Focus cycle timer.
//!
//! A tick-driven state machine over Focus, Short Break and Long Break. The
//! timer never reads a clock: it arms a [`TickScheduler`] and counts down
//! one second per [`Tick`] handed back through [`FocusCycleTimer::on_tick`].
//!
//! ## State Transitions
//!
//! ```text
//! Idle -start-> Running -pause-> Paused -resume-> Running
//!   ^              |
//!   +-- reset / phase completed (mode and round advance) --+
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let (scheduler, mut ticks) = IntervalScheduler::new();
//! let mut timer = FocusCycleTimer::new(config, scheduler, Box::new(NullSink))?;
//! timer.start();
//! while let Some(tick) = ticks.recv().await {
//!     timer.on_tick(tick);
//! }
//! ```

use chrono::Utc;
use tracing::{debug, info, trace, warn};

use super::config::{ConfigPatch, TimerConfiguration};
use super::mode::{next_phase, TimerMode};
use super::scheduler::{ManualScheduler, Tick, TickScheduler, TICK_PERIOD};
use crate::accounting::FocusTimeSink;
use crate::error::TimerError;
use crate::events::Event;

/// Countdown over the focus cycle.
///
/// Owns its scheduler and accounting sink. Dropping the timer cancels any
/// armed tick.
pub struct FocusCycleTimer<S: TickScheduler = ManualScheduler> {
    config: TimerConfiguration,
    mode: TimerMode,
    remaining_secs: u64,
    is_running: bool,
    is_paused: bool,
    current_round: u32,
    /// Generation of the armed tick task, `None` while nothing is armed.
    armed: Option<u64>,
    next_generation: u64,
    scheduler: S,
    sink: Box<dyn FocusTimeSink>,
}

impl<S: TickScheduler> FocusCycleTimer<S> {
    /// Create an idle timer at round 1 of Focus.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidConfiguration`] if `config` has a zero
    /// duration or zero rounds.
    pub fn new(
        config: TimerConfiguration,
        scheduler: S,
        sink: Box<dyn FocusTimeSink>,
    ) -> Result<Self, TimerError> {
        config.validate()?;
        Ok(Self {
            config,
            mode: TimerMode::Focus,
            remaining_secs: TimerMode::Focus.duration_secs(&config),
            is_running: false,
            is_paused: false,
            current_round: 1,
            armed: None,
            next_generation: 0,
            scheduler,
            sink,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    /// True from `start()` until `reset()` or phase completion, paused or not.
    pub fn is_active(&self) -> bool {
        self.is_running || self.is_paused
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn configuration(&self) -> &TimerConfiguration {
        &self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Full length of the current phase in seconds.
    pub fn total_seconds(&self) -> u64 {
        self.mode.duration_secs(&self.config)
    }

    /// Remaining time as zero-padded `MM:SS`.
    pub fn formatted_time(&self) -> String {
        format_mm_ss(self.remaining_secs)
    }

    /// 1.0 at the start of a phase, 0.0 when it runs out.
    pub fn progress_fraction(&self) -> f64 {
        let total = self.total_seconds();
        if total == 0 {
            return 0.0;
        }
        self.remaining_secs as f64 / total as f64
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            round: self.current_round,
            rounds_per_cycle: self.config.rounds_per_cycle,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_seconds(),
            formatted_time: self.formatted_time(),
            progress_fraction: self.progress_fraction(),
            is_running: self.is_running,
            is_paused: self.is_paused,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin ticking from the current remaining time. Calling it while
    /// running re-arms the tick without touching the countdown.
    pub fn start(&mut self) -> Option<Event> {
        self.is_running = true;
        self.is_paused = false;
        self.arm();
        debug!(
            mode = ?self.mode,
            round = self.current_round,
            remaining_secs = self.remaining_secs,
            "timer started"
        );
        Some(Event::TimerStarted {
            mode: self.mode,
            round: self.current_round,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Halt ticking and keep the remaining time. No effect unless running.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.is_running || self.is_paused {
            return None;
        }
        self.disarm();
        self.is_paused = true;
        debug!(remaining_secs = self.remaining_secs, "timer paused");
        Some(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Clear the pause and start ticking again from the remaining time.
    pub fn resume(&mut self) -> Option<Event> {
        self.is_paused = false;
        self.start()?;
        Some(Event::TimerResumed {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Stop and rewind the current phase. Mode and round are kept.
    pub fn reset(&mut self) -> Option<Event> {
        self.disarm();
        self.is_running = false;
        self.is_paused = false;
        self.remaining_secs = self.total_seconds();
        debug!(mode = ?self.mode, remaining_secs = self.remaining_secs, "timer reset");
        Some(Event::TimerReset {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Switch phase and load its full duration. Run state is left alone;
    /// callers stop the timer first if they need to.
    pub fn set_mode(&mut self, mode: TimerMode) -> Option<Event> {
        let from = self.mode;
        self.mode = mode;
        self.remaining_secs = self.total_seconds();
        debug!(?from, to = ?mode, "mode changed");
        Some(Event::ModeChanged {
            from,
            to: mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Merge `patch` into the configuration, then reset the current phase.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidConfiguration`] if the merged
    /// configuration is invalid. The timer is left untouched in that case.
    pub fn update_config(&mut self, patch: &ConfigPatch) -> Result<Event, TimerError> {
        let config = self.config.merged(patch)?;
        self.config = config;
        self.current_round = self.current_round.min(config.rounds_per_cycle);
        self.reset();
        debug!(?config, "configuration updated");
        Ok(Event::ConfigUpdated {
            config,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Advance the countdown by one second.
    ///
    /// Ticks from a task that is no longer armed, or that arrive while the
    /// timer is paused or stopped, are dropped. Returns
    /// `Some(Event::PhaseCompleted)` on the tick that ends a phase.
    pub fn on_tick(&mut self, tick: Tick) -> Option<Event> {
        if !self.is_running || self.is_paused || self.armed != Some(tick.generation) {
            trace!(generation = tick.generation, "stale tick dropped");
            return None;
        }
        if self.remaining_secs > 1 {
            self.remaining_secs -= 1;
            return None;
        }
        Some(self.complete_phase())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_phase(&mut self) -> Event {
        self.disarm();
        let completed = self.mode;

        let credited_minutes = if completed == TimerMode::Focus {
            let minutes = self.config.focus_minutes;
            if let Err(e) = self.sink.focus_completed(minutes) {
                warn!(error = %e, minutes, "failed to record focus time");
            }
            Some(minutes)
        } else {
            None
        };

        let (next, round) = next_phase(completed, self.current_round, self.config.rounds_per_cycle);
        self.mode = next;
        self.current_round = round;
        self.remaining_secs = self.total_seconds();
        self.is_running = false;
        self.is_paused = false;

        info!(?completed, ?next, round, "phase completed");
        Event::PhaseCompleted {
            completed,
            next,
            round,
            credited_minutes,
            at: Utc::now(),
        }
    }

    fn arm(&mut self) {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.scheduler.arm(generation, TICK_PERIOD);
        self.armed = Some(generation);
    }

    fn disarm(&mut self) {
        self.scheduler.cancel();
        self.armed = None;
    }
}

impl<S: TickScheduler> Drop for FocusCycleTimer<S> {
    fn drop(&mut self) {
        self.disarm();
    }
}

impl<S: TickScheduler + std::fmt::Debug> std::fmt::Debug for FocusCycleTimer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusCycleTimer")
            .field("config", &self.config)
            .field("mode", &self.mode)
            .field("remaining_secs", &self.remaining_secs)
            .field("is_running", &self.is_running)
            .field("is_paused", &self.is_paused)
            .field("current_round", &self.current_round)
            .field("armed", &self.armed)
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

/// Format seconds as `MM:SS`; minutes are not capped at 59.
pub fn format_mm_ss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
