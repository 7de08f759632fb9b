//! Status line text.
//!
//! Pure string builders; the host decides where the text goes.

use std::fmt;

use crate::timer::{CycleSnapshot, Phase};

/// Combining long stroke overlay (U+0336).
const STRIKE: char = '\u{0336}';

pub const PLAY_GLYPH: &str = "▶";
pub const PAUSE_GLYPH: &str = "⏸";

/// `completed` filled marks followed by outlines up to `total`.
///
/// `completed` larger than `total` renders `completed` filled marks and no
/// outlines.
pub fn check_marks(completed: u32, total: u32, filled: &str, empty: &str) -> String {
    let filled_count = completed as usize;
    let empty_count = total.saturating_sub(completed) as usize;
    let width = filled.len().max(empty.len());
    let mut out = String::with_capacity((filled_count + empty_count) * width);
    out.push_str(&filled.repeat(filled_count));
    out.push_str(&empty.repeat(empty_count));
    out
}

/// Append a strike-through overlay after every character.
pub fn strike_text(text: &str) -> String {
    text.chars().flat_map(|c| [c, STRIKE]).collect()
}

/// One-line rendering of the controller: action glyph, clock, progress marks
/// and phase label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub action: &'static str,
    pub clock: String,
    pub marks: String,
    pub phase: Phase,
    pub snooze_pending: bool,
}

impl StatusLine {
    pub fn new(snapshot: &CycleSnapshot, filled: &str, empty: &str) -> Self {
        // The action glyph shows what pressing the button would do.
        let action = match snapshot.phase {
            Phase::Paused => PLAY_GLYPH,
            Phase::Working | Phase::Break => PAUSE_GLYPH,
        };
        Self {
            action,
            clock: snapshot.clock.clone(),
            marks: check_marks(snapshot.cycles_completed, snapshot.max_cycles, filled, empty),
            phase: snapshot.phase,
            snooze_pending: snapshot.snooze_pending,
        }
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.action,
            self.clock,
            self.marks,
            self.phase.label()
        )?;
        if self.snooze_pending {
            f.write_str(" (snooze? y/n)")?;
        }
        Ok(())
    }
}
