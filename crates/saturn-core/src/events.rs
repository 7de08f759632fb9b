use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Phase;

/// Every notification the cycle controller emits, in a form that can cross a
/// channel or be printed as a JSON line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CycleEvent {
    Tick {
        phase: Phase,
        time_left_secs: u64,
        clock: String,
        at: DateTime<Utc>,
    },
    Progress {
        completed: u32,
        total: u32,
        at: DateTime<Utc>,
    },
    PhaseChanged {
        from: Phase,
        to: Phase,
        at: DateTime<Utc>,
    },
    /// A phase ran out and the host is asked whether to snooze.
    SnoozeRequested {
        phase: Phase,
        cycles_completed: u32,
        at: DateTime<Utc>,
    },
}
