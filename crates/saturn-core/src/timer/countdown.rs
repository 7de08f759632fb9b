//! Countdown timer primitive.
//!
//! The timer has no thread and no clock of its own. The host's scheduler calls
//! [`Timer::tick`] once per [`TICK_SECS`] while the timer is running; the
//! returned [`Tick`] tells the caller what happened during that interval.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Seconds consumed by a single tick.
pub const TICK_SECS: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Running,
    Paused,
}

/// Result of one scheduler interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The timer was paused; nothing happened.
    Idle,
    /// One interval elapsed. `shown` is the time left before the decrement.
    Elapsed { shown: u64 },
    /// The interval that emptied the timer. The timer has paused itself.
    Completed { shown: u64 },
}

impl Tick {
    pub fn is_completed(self) -> bool {
        matches!(self, Tick::Completed { .. })
    }
}

/// Decrementing time budget in whole seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timer {
    time_left: u64,
    default_time: u64,
    state: RunState,
    /// Whether `resume` has ever been called. A timer that never ran cannot
    /// be paused.
    started: bool,
}

impl Timer {
    /// Create a paused timer holding `default_time` seconds.
    pub fn new(default_time: u64) -> Self {
        Self {
            time_left: default_time,
            default_time,
            state: RunState::Paused,
            started: false,
        }
    }

    pub fn time_left(&self) -> u64 {
        self.time_left
    }

    pub fn default_time(&self) -> u64 {
        self.default_time
    }

    pub fn set_default_time(&mut self, secs: u64) {
        self.default_time = secs;
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Start ticking. Returns `false` if the timer was already running.
    pub fn resume(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = RunState::Running;
        self.started = true;
        true
    }

    /// Stop ticking. Returns `false` if already paused or never started.
    pub fn pause(&mut self) -> bool {
        if !self.is_running() || !self.started {
            return false;
        }
        self.state = RunState::Paused;
        true
    }

    /// Pause and reload `default_time`.
    pub fn reset(&mut self) {
        self.reset_to(self.default_time);
    }

    /// Pause and reload an explicit number of seconds.
    pub fn reset_to(&mut self, secs: u64) {
        self.pause();
        self.time_left = secs;
    }

    /// Extend the budget without touching the run state.
    pub fn add_time(&mut self, secs: u64) {
        self.time_left = self.time_left.saturating_add(secs);
    }

    /// Advance one interval.
    ///
    /// The tick is reported with the value the host should display, then the
    /// budget is decremented. Reaching zero pauses the timer and reports
    /// completion for this same interval.
    pub fn tick(&mut self) -> Tick {
        if !self.is_running() {
            return Tick::Idle;
        }
        let shown = self.time_left;
        self.time_left = self.time_left.saturating_sub(TICK_SECS);
        if self.time_left == 0 {
            self.pause();
            return Tick::Completed { shown };
        }
        Tick::Elapsed { shown }
    }
}

impl fmt::Display for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_clock(self.time_left))
    }
}

/// Render seconds as `MM:SS`, or `HH:MM:SS` once there is at least one hour.
pub fn format_clock(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}
