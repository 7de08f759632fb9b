//! Observer seams between the cycle controller and its host.
//!
//! A controller works with no listener at all; the host attaches one when it
//! wants to render progress. [`ChannelListener`] and [`ChannelSnoozePrompt`]
//! forward everything as [`CycleEvent`]s so an async host can consume them
//! from its own loop.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use super::countdown::format_clock;
use super::schedule::Phase;
use crate::events::CycleEvent;

/// What the host needs to refresh its countdown display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSnapshot {
    pub phase: Phase,
    pub time_left_secs: u64,
}

impl TickSnapshot {
    pub fn clock(&self) -> String {
        format_clock(self.time_left_secs)
    }
}

/// Receives controller notifications. Every method defaults to a no-op.
pub trait CycleListener {
    fn on_tick(&mut self, _tick: TickSnapshot) {}

    /// Called whenever the completed cycle count changes or is re-announced.
    fn on_progress(&mut self, _completed: u32, _total: u32) {}

    fn on_phase_change(&mut self, _from: Phase, _to: Phase) {}
}

/// State captured right before a completion is handed to the snooze prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnoozeRequest {
    pub phase: Phase,
    pub cycles_completed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnoozeResponse {
    /// Snooze now, restoring the captured state.
    Accept,
    /// Carry on with the phase transition.
    Decline,
    /// The answer comes later through `snooze` or `decline_snooze`.
    Pending,
}

/// Asked on every timer completion whether the transition should be snoozed.
pub trait SnoozePrompt {
    fn prompt(&mut self, request: SnoozeRequest) -> SnoozeResponse;
}

impl<F> SnoozePrompt for F
where
    F: FnMut(SnoozeRequest) -> SnoozeResponse,
{
    fn prompt(&mut self, request: SnoozeRequest) -> SnoozeResponse {
        self(request)
    }
}

/// Forwards notifications as [`CycleEvent`]s.
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: UnboundedSender<CycleEvent>,
}

impl ChannelListener {
    pub fn new(tx: UnboundedSender<CycleEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: CycleEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("cycle event dropped, receiver closed");
        }
    }
}

impl CycleListener for ChannelListener {
    fn on_tick(&mut self, tick: TickSnapshot) {
        self.send(CycleEvent::Tick {
            phase: tick.phase,
            time_left_secs: tick.time_left_secs,
            clock: tick.clock(),
            at: Utc::now(),
        });
    }

    fn on_progress(&mut self, completed: u32, total: u32) {
        self.send(CycleEvent::Progress {
            completed,
            total,
            at: Utc::now(),
        });
    }

    fn on_phase_change(&mut self, from: Phase, to: Phase) {
        self.send(CycleEvent::PhaseChanged {
            from,
            to,
            at: Utc::now(),
        });
    }
}

/// Sends a [`CycleEvent::SnoozeRequested`] and leaves the decision pending.
///
/// If nobody is listening any more the prompt declines, so the cycle keeps
/// advancing instead of stalling forever.
#[derive(Debug, Clone)]
pub struct ChannelSnoozePrompt {
    tx: UnboundedSender<CycleEvent>,
}

impl ChannelSnoozePrompt {
    pub fn new(tx: UnboundedSender<CycleEvent>) -> Self {
        Self { tx }
    }
}

impl SnoozePrompt for ChannelSnoozePrompt {
    fn prompt(&mut self, request: SnoozeRequest) -> SnoozeResponse {
        let event = CycleEvent::SnoozeRequested {
            phase: request.phase,
            cycles_completed: request.cycles_completed,
            at: Utc::now(),
        };
        match self.tx.send(event) {
            Ok(()) => SnoozeResponse::Pending,
            Err(_) => SnoozeResponse::Decline,
        }
    }
}
