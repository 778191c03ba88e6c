use serde::{Deserialize, Serialize};

use crate::error::TimerError;

/// Phase durations and cycle length.
///
/// Every value held by a timer has passed [`TimerConfiguration::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfiguration {
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u32,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,
    #[serde(default = "default_rounds_per_cycle")]
    pub rounds_per_cycle: u32,
}

/// Fields to overwrite on the current configuration; `None` keeps the value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_break_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_break_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounds_per_cycle: Option<u32>,
}

fn default_focus_minutes() -> u32 {
    25
}
fn default_short_break_minutes() -> u32 {
    5
}
fn default_long_break_minutes() -> u32 {
    15
}
fn default_rounds_per_cycle() -> u32 {
    4
}

impl Default for TimerConfiguration {
    fn default() -> Self {
        Self {
            focus_minutes: default_focus_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            rounds_per_cycle: default_rounds_per_cycle(),
        }
    }
}

impl TimerConfiguration {
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidConfiguration`] for the first field that
    /// is zero.
    pub fn validate(&self) -> Result<(), TimerError> {
        let fields = [
            ("focus_minutes", self.focus_minutes),
            ("short_break_minutes", self.short_break_minutes),
            ("long_break_minutes", self.long_break_minutes),
            ("rounds_per_cycle", self.rounds_per_cycle),
        ];
        for (field, value) in fields {
            if value == 0 {
                return Err(TimerError::InvalidConfiguration { field, value });
            }
        }
        Ok(())
    }

    /// Apply `patch` to a copy of `self` and validate the result.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::InvalidConfiguration`] if the merged
    /// configuration is invalid; `self` is never modified.
    pub fn merged(&self, patch: &ConfigPatch) -> Result<Self, TimerError> {
        let next = Self {
            focus_minutes: patch.focus_minutes.unwrap_or(self.focus_minutes),
            short_break_minutes: patch.short_break_minutes.unwrap_or(self.short_break_minutes),
            long_break_minutes: patch.long_break_minutes.unwrap_or(self.long_break_minutes),
            rounds_per_cycle: patch.rounds_per_cycle.unwrap_or(self.rounds_per_cycle),
        };
        next.validate()?;
        Ok(next)
    }
}

impl ConfigPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
