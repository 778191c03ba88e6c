use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{TimerConfiguration, TimerMode};

/// Every state change of a timer produces an Event.
/// Embedders render them; the CLI prints them as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        round: u32,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    ModeChanged {
        from: TimerMode,
        to: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    ConfigUpdated {
        config: TimerConfiguration,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A phase ran down to zero. The timer is stopped on `next`.
    PhaseCompleted {
        completed: TimerMode,
        next: TimerMode,
        round: u32,
        /// Minutes handed to focus-time accounting, for focus phases.
        credited_minutes: Option<u32>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TimerMode,
        round: u32,
        rounds_per_cycle: u32,
        remaining_secs: u64,
        total_secs: u64,
        formatted_time: String,
        progress_fraction: f64,
        is_running: bool,
        is_paused: bool,
        at: DateTime<Utc>,
    },
}
