//! # Saturn Core Library
//!
//! Core logic for the Saturn work/break timer. A host (the `saturn` CLI, or
//! any status-bar integration) drives it by calling `tick()` once per second
//! and renders whatever the controller reports back.
//!
//! ## Architecture
//!
//! - **Countdown Timer**: a whole-second budget with pause/resume/reset
//! - **Cycle Controller**: the Working/Break/Paused state machine with cycle
//!   counting, long-break selection and snooze
//! - **Storage**: TOML-based configuration
//! - **Display**: status line text (clock, progress marks, struck-out tasks)
//! - **Tasks**: in-memory to-do list shown next to the timer
//!
//! ## Key Components
//!
//! - [`CycleController`]: cycle state machine
//! - [`Timer`]: countdown primitive
//! - [`CycleListener`] / [`SnoozePrompt`]: host-facing seams
//! - [`Config`]: application configuration management

pub mod display;
pub mod error;
pub mod events;
pub mod storage;
pub mod task;
pub mod timer;

pub use display::{check_marks, strike_text, StatusLine};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::CycleEvent;
pub use storage::Config;
pub use task::{TaskItem, TaskList};
pub use timer::{
    format_clock, ChannelListener, ChannelSnoozePrompt, CycleConfig, CycleController,
    CycleListener, CycleSnapshot, Phase, SnoozePrompt, SnoozeRequest, SnoozeResponse, Tick,
    TickSnapshot, Timer,
};
