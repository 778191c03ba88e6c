mod config;
pub mod controls;
mod engine;
mod mode;
pub mod scheduler;

pub use config::{ConfigPatch, TimerConfiguration};
pub use controls::{request_mode_switch, ModeSwitch, MODE_SWITCH_PROMPT};
pub use engine::{format_mm_ss, FocusCycleTimer};
pub use mode::{next_phase, TimerMode};
pub use scheduler::{IntervalScheduler, ManualScheduler, Tick, TickScheduler, TICK_PERIOD};
