//! Work/break cycle controller.
//!
//! The controller owns a [`Timer`] and has no thread of its own: the host
//! calls [`CycleController::tick`] once per second.
//!
//! ## State Transitions
//!
//! ```text
//! Paused --resume--> Working --complete--> Break --complete--> Working ...
//!    ^                  |
//!    +------pause-------+
//! ```
//!
//! Breaks cannot be paused. Every completion is first offered to the snooze
//! prompt, which can hold the transition back until the host answers.
//!
//! ## Usage
//!
//! ```ignore
//! let mut cycle = CycleController::new(CycleConfig::default());
//! cycle.resume();
//! // Once per second:
//! cycle.tick();
//! ```

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use super::countdown::{format_clock, Tick, Timer};
use super::listener::{CycleListener, SnoozePrompt, SnoozeRequest, SnoozeResponse, TickSnapshot};
use super::schedule::{CycleConfig, Phase};

/// Serializable view of the controller for status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleSnapshot {
    pub phase: Phase,
    pub cycles_completed: u32,
    pub max_cycles: u32,
    pub time_left_secs: u64,
    pub clock: String,
    pub snooze_pending: bool,
}

pub struct CycleController {
    config: CycleConfig,
    timer: Timer,
    phase: Phase,
    cycles_completed: u32,
    /// Set while a snooze prompt has not been answered.
    pending_snooze: Option<SnoozeRequest>,
    listener: Option<Box<dyn CycleListener>>,
    snooze_prompt: Option<Box<dyn SnoozePrompt>>,
}

impl CycleController {
    /// Create a paused controller with the work duration loaded.
    pub fn new(config: CycleConfig) -> Self {
        Self {
            config,
            timer: Timer::new(config.work_secs()),
            phase: Phase::Paused,
            cycles_completed: 0,
            pending_snooze: None,
            listener: None,
            snooze_prompt: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn time_left(&self) -> u64 {
        self.timer.time_left()
    }

    pub fn pending_snooze(&self) -> Option<SnoozeRequest> {
        self.pending_snooze
    }

    pub fn snapshot(&self) -> CycleSnapshot {
        CycleSnapshot {
            phase: self.phase,
            cycles_completed: self.cycles_completed,
            max_cycles: self.config.max_cycles(),
            time_left_secs: self.timer.time_left(),
            clock: format_clock(self.timer.time_left()),
            snooze_pending: self.pending_snooze.is_some(),
        }
    }

    // ── Collaborators ────────────────────────────────────────────────

    /// Attach a listener, returning the one it replaces.
    pub fn set_listener(
        &mut self,
        listener: Box<dyn CycleListener>,
    ) -> Option<Box<dyn CycleListener>> {
        self.listener.replace(listener)
    }

    pub fn clear_listener(&mut self) -> Option<Box<dyn CycleListener>> {
        self.listener.take()
    }

    /// Attach a snooze prompt, returning the one it replaces.
    pub fn set_snooze_prompt(
        &mut self,
        prompt: Box<dyn SnoozePrompt>,
    ) -> Option<Box<dyn SnoozePrompt>> {
        self.snooze_prompt.replace(prompt)
    }

    pub fn clear_snooze_prompt(&mut self) -> Option<Box<dyn SnoozePrompt>> {
        self.snooze_prompt.take()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Paused -> Working. Returns `false` from any other phase.
    pub fn resume(&mut self) -> bool {
        if self.phase != Phase::Paused {
            return false;
        }
        if !self.timer.resume() {
            return false;
        }
        self.set_phase(Phase::Working);
        true
    }

    /// Working -> Paused. Returns `false` from Break or Paused.
    pub fn pause(&mut self) -> bool {
        if self.phase != Phase::Working {
            return false;
        }
        if !self.timer.pause() {
            return false;
        }
        self.set_phase(Phase::Paused);
        true
    }

    /// Back to a paused, zero-cycle work phase. Drops any pending snooze.
    pub fn reset(&mut self) {
        self.timer.reset_to(self.config.work_secs());
        self.cycles_completed = 0;
        self.pending_snooze = None;
        self.set_phase(Phase::Paused);
        self.notify_progress();
    }

    /// Swap in a new configuration and reset.
    ///
    /// `CycleConfig` is validated when it is built, so there is nothing left
    /// to reject here.
    pub fn reconfigure(&mut self, config: CycleConfig) {
        debug!(?config, "reconfiguring cycle controller");
        self.config = config;
        self.timer.set_default_time(config.work_secs());
        self.reset();
    }

    /// Advance one scheduler interval.
    ///
    /// The tick notification goes out first; a completion is handled right
    /// after it, within the same call.
    pub fn tick(&mut self) -> Tick {
        let tick = self.timer.tick();
        let shown = match tick {
            Tick::Idle => return tick,
            Tick::Elapsed { shown } | Tick::Completed { shown } => shown,
        };
        trace!(phase = ?self.phase, time_left = shown, "tick");
        let snapshot = TickSnapshot {
            phase: self.phase,
            time_left_secs: shown,
        };
        match self.listener.as_mut() {
            Some(listener) => listener.on_tick(snapshot),
            None => {}
        }
        if tick.is_completed() {
            self.on_timer_completed();
        }
        tick
    }

    /// Restore `phase` and `cycles_completed` and run the snooze duration
    /// before that state is allowed to advance again.
    ///
    /// Returns `false` for `Phase::Paused` or a cycle count above the
    /// configured maximum.
    pub fn snooze(&mut self, phase: Phase, cycles_completed: u32) -> bool {
        if phase == Phase::Paused || cycles_completed > self.config.max_cycles() {
            return false;
        }
        debug!(?phase, cycles_completed, "snoozing");
        self.pending_snooze = None;
        self.cycles_completed = cycles_completed;
        self.notify_progress();
        self.timer.reset_to(self.config.snooze_secs());
        self.timer.resume();
        self.set_phase(phase);
        true
    }

    /// Answer a pending snooze prompt with "no": the held-back transition
    /// happens now. Returns `false` when nothing is pending.
    pub fn decline_snooze(&mut self) -> bool {
        match self.pending_snooze.take() {
            Some(request) => {
                debug!(phase = ?request.phase, "snooze declined");
                self.advance();
                true
            }
            None => false,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn on_timer_completed(&mut self) {
        if self.phase == Phase::Paused {
            return;
        }
        let request = SnoozeRequest {
            phase: self.phase,
            cycles_completed: self.cycles_completed,
        };
        let response = match self.snooze_prompt.as_mut() {
            Some(prompt) => prompt.prompt(request),
            None => SnoozeResponse::Decline,
        };
        match response {
            SnoozeResponse::Accept => {
                self.snooze(request.phase, request.cycles_completed);
            }
            SnoozeResponse::Pending => {
                debug!(phase = ?request.phase, "completion held for snooze prompt");
                self.pending_snooze = Some(request);
            }
            SnoozeResponse::Decline => self.advance(),
        }
    }

    fn advance(&mut self) {
        match self.phase {
            Phase::Working => {
                self.cycles_completed = self.next_cycle_count();
                self.notify_progress();
                self.timer
                    .reset_to(self.config.break_secs_after(self.cycles_completed));
                self.timer.resume();
                self.set_phase(Phase::Break);
            }
            Phase::Break => {
                if self.cycles_completed == self.config.max_cycles() {
                    self.cycles_completed = 0;
                    self.notify_progress();
                }
                self.timer.reset_to(self.config.work_secs());
                self.timer.resume();
                self.set_phase(Phase::Working);
            }
            Phase::Paused => {}
        }
    }

    fn next_cycle_count(&self) -> u32 {
        if self.cycles_completed >= self.config.max_cycles() {
            0
        } else {
            self.cycles_completed + 1
        }
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.phase;
        self.phase = to;
        if from == to {
            return;
        }
        debug!(from = from.label(), to = to.label(), "phase change");
        match self.listener.as_mut() {
            Some(listener) => listener.on_phase_change(from, to),
            None => {}
        }
    }

    fn notify_progress(&mut self) {
        let (completed, total) = (self.cycles_completed, self.config.max_cycles());
        match self.listener.as_mut() {
            Some(listener) => listener.on_progress(completed, total),
            None => {}
        }
    }
}

impl fmt::Debug for CycleController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CycleController")
            .field("config", &self.config)
            .field("timer", &self.timer)
            .field("phase", &self.phase)
            .field("cycles_completed", &self.cycles_completed)
            .field("pending_snooze", &self.pending_snooze)
            .field("has_listener", &self.listener.is_some())
            .field("has_snooze_prompt", &self.snooze_prompt.is_some())
            .finish()
    }
}

impl Default for CycleController {
    fn default() -> Self {
        Self::new(CycleConfig::default())
    }
}
