//! # Focus Cycle Core Library
//!
//! Core logic of the Focus Cycle study companion: a countdown that cycles
//! through focus, short-break and long-break phases and credits completed
//! focus time to an accounting collaborator.
//!
//! ## Architecture
//!
//! - **Timer**: a tick-driven state machine. It owns a [`TickScheduler`]
//!   that delivers one [`Tick`] per second; the embedder feeds those ticks
//!   back through [`FocusCycleTimer::on_tick`]
//! - **Accounting**: [`FocusTimeSink`] receives the configured focus minutes
//!   whenever a focus phase completes
//! - **Storage**: TOML settings and an SQLite focus ledger
//!
//! ## Key Components
//!
//! - [`FocusCycleTimer`]: core timer state machine
//! - [`IntervalScheduler`] / [`ManualScheduler`]: real and deterministic tick sources
//! - [`Database`]: focus ledger and statistics
//! - [`Config`]: application configuration management

pub mod accounting;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use accounting::{FocusTimeSink, MemoryLedger, NullSink};
pub use error::{ConfigError, CoreError, DatabaseError, TimerError};
pub use events::Event;
pub use storage::{Config, Database, FocusStats, FocusWindowStats};
pub use timer::{
    request_mode_switch, ConfigPatch, FocusCycleTimer, IntervalScheduler, ManualScheduler,
    ModeSwitch, Tick, TickScheduler, TimerConfiguration, TimerMode,
};
