use serde::{Deserialize, Serialize};

use super::config::TimerConfiguration;

/// The phase a timer is counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [TimerMode::Focus, TimerMode::ShortBreak, TimerMode::LongBreak];

    /// Configured length of this phase in minutes.
    pub fn duration_min(self, config: &TimerConfiguration) -> u32 {
        match self {
            TimerMode::Focus => config.focus_minutes,
            TimerMode::ShortBreak => config.short_break_minutes,
            TimerMode::LongBreak => config.long_break_minutes,
        }
    }

    /// Configured length of this phase in seconds.
    pub fn duration_secs(self, config: &TimerConfiguration) -> u64 {
        u64::from(self.duration_min(config)).saturating_mul(60)
    }

    pub fn is_break(self) -> bool {
        !matches!(self, TimerMode::Focus)
    }

    /// Short name accepted by [`FromStr`](std::str::FromStr).
    pub fn keyword(self) -> &'static str {
        match self {
            TimerMode::Focus => "focus",
            TimerMode::ShortBreak => "short",
            TimerMode::LongBreak => "long",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus",
            TimerMode::ShortBreak => "Short Break",
            TimerMode::LongBreak => "Long Break",
        }
    }
}

impl std::fmt::Display for TimerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "focus" => Ok(TimerMode::Focus),
            "short" | "short_break" => Ok(TimerMode::ShortBreak),
            "long" | "long_break" => Ok(TimerMode::LongBreak),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Where the cycle goes after `mode` completes at `round`.
///
/// Rounds only move on Focus -> Break: the last focus round of a cycle leads
/// to a long break and wraps the round back to 1, every other focus round
/// leads to a short break and advances the round. Breaks always return to
/// Focus with the round left alone.
pub fn next_phase(mode: TimerMode, round: u32, rounds_per_cycle: u32) -> (TimerMode, u32) {
    match mode {
        TimerMode::Focus if round >= rounds_per_cycle => (TimerMode::LongBreak, 1),
        TimerMode::Focus => (TimerMode::ShortBreak, round + 1),
        TimerMode::ShortBreak | TimerMode::LongBreak => (TimerMode::Focus, round),
    }
}
