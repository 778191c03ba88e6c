//! Mode buttons of an embedding screen.

use tracing::debug;

use super::engine::FocusCycleTimer;
use super::mode::TimerMode;
use super::scheduler::TickScheduler;

/// Question asked before an active session is thrown away.
pub const MODE_SWITCH_PROMPT: &str = "Changing modes will reset the timer. Continue?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSwitch {
    Switched,
    /// The user kept the running session.
    Declined,
}

/// Switch `timer` to `mode` the way a mode button does.
///
/// While a session is active (running or paused) `confirm` is asked with
/// [`MODE_SWITCH_PROMPT`] first. On confirmation, or when idle, the timer is
/// reset and switched. The round is never changed here.
pub fn request_mode_switch<S, F>(timer: &mut FocusCycleTimer<S>, mode: TimerMode, confirm: F) -> ModeSwitch
where
    S: TickScheduler,
    F: FnOnce(&str) -> bool,
{
    if timer.is_active() && !confirm(MODE_SWITCH_PROMPT) {
        debug!(?mode, "mode switch declined");
        return ModeSwitch::Declined;
    }
    timer.reset();
    timer.set_mode(mode);
    ModeSwitch::Switched
}
