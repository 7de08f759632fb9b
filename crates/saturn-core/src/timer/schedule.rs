//! Cycle phases and the cycle configuration value.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Upper bound on `max_cycles`; the status line draws one mark per cycle.
pub const MAX_CYCLES_LIMIT: u32 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Working,
    Break,
    Paused,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Working => "Working",
            Phase::Break => "Break",
            Phase::Paused => "Paused",
        }
    }
}

/// Immutable cycle configuration. All durations are in seconds.
///
/// A controller never sees a half-applied configuration: changes go through
/// `CycleController::reconfigure` as a whole value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleConfig {
    max_cycles: u32,
    work_secs: u64,
    short_break_secs: u64,
    long_break_secs: u64,
    snooze_secs: u64,
}

impl CycleConfig {
    /// Build and validate a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Zero`] when `max_cycles` or `work_secs` is zero,
    /// and [`ValidationError::InvalidValue`] when `max_cycles` exceeds
    /// [`MAX_CYCLES_LIMIT`].
    pub fn new(
        max_cycles: u32,
        work_secs: u64,
        short_break_secs: u64,
        long_break_secs: u64,
        snooze_secs: u64,
    ) -> Result<Self, ValidationError> {
        let config = Self {
            max_cycles,
            work_secs,
            short_break_secs,
            long_break_secs,
            snooze_secs,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_cycles == 0 {
            return Err(ValidationError::Zero { field: "max_cycles" });
        }
        if self.max_cycles > MAX_CYCLES_LIMIT {
            return Err(ValidationError::InvalidValue {
                field: "max_cycles".to_string(),
                message: format!("at most {MAX_CYCLES_LIMIT} cycles per round"),
            });
        }
        if self.work_secs == 0 {
            return Err(ValidationError::Zero { field: "work_secs" });
        }
        Ok(())
    }

    pub fn max_cycles(&self) -> u32 {
        self.max_cycles
    }

    pub fn work_secs(&self) -> u64 {
        self.work_secs
    }

    pub fn short_break_secs(&self) -> u64 {
        self.short_break_secs
    }

    pub fn long_break_secs(&self) -> u64 {
        self.long_break_secs
    }

    pub fn snooze_secs(&self) -> u64 {
        self.snooze_secs
    }

    /// Break length earned after `cycles_completed` work cycles.
    pub fn break_secs_after(&self, cycles_completed: u32) -> u64 {
        if cycles_completed == self.max_cycles {
            self.long_break_secs
        } else {
            self.short_break_secs
        }
    }

    /// Total seconds of one full round: every work phase plus its break.
    pub fn round_secs(&self) -> u64 {
        let cycles = u64::from(self.max_cycles);
        let work = self.work_secs.saturating_mul(cycles);
        let short = self.short_break_secs.saturating_mul(cycles.saturating_sub(1));
        work.saturating_add(short).saturating_add(self.long_break_secs)
    }
}

impl Default for CycleConfig {
    /// 4 cycles of 25 minutes, 5 minute short breaks, 15 minute long break,
    /// 5 minute snooze.
    fn default() -> Self {
        Self {
            max_cycles: 4,
            work_secs: 25 * 60,
            short_break_secs: 5 * 60,
            long_break_secs: 15 * 60,
            snooze_secs: 5 * 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(CycleConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_cycles_rejected() {
        assert_eq!(
            CycleConfig::new(0, 1500, 300, 900, 300),
            Err(ValidationError::Zero { field: "max_cycles" })
        );
    }

    #[test]
    fn zero_work_rejected() {
        assert_eq!(
            CycleConfig::new(4, 0, 300, 900, 300),
            Err(ValidationError::Zero { field: "work_secs" })
        );
    }

    #[test]
    fn cycle_count_is_capped() {
        assert!(CycleConfig::new(MAX_CYCLES_LIMIT, 60, 0, 0, 0).is_ok());
        assert!(matches!(
            CycleConfig::new(4_000_000_000, 60, 0, 0, 0),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn zero_breaks_are_allowed() {
        assert!(CycleConfig::new(1, 60, 0, 0, 0).is_ok());
    }

    #[test]
    fn long_break_only_after_last_cycle() {
        let config = CycleConfig::new(4, 1500, 300, 600, 300).unwrap();
        assert_eq!(config.break_secs_after(1), 300);
        assert_eq!(config.break_secs_after(3), 300);
        assert_eq!(config.break_secs_after(4), 600);
    }

    #[test]
    fn round_duration() {
        let config = CycleConfig::new(4, 1500, 300, 600, 300).unwrap();
        assert_eq!(config.round_secs(), 4 * 1500 + 3 * 300 + 600);
    }
}
