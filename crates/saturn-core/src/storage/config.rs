//! TOML-based application configuration.
//!
//! Stores:
//! - Cycle count and phase durations (in minutes)
//! - Status line marks
//!
//! Configuration is stored at `~/.config/saturn/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result, ValidationError};
use crate::timer::CycleConfig;

/// Timer settings as the user writes them. Durations are minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default = "default_cycles")]
    pub cycles: u32,
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u64,
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u64,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u64,
    #[serde(default = "default_snooze_minutes")]
    pub snooze_minutes: u64,
}

impl TimerSettings {
    /// Convert to the controller's seconds-based configuration.
    pub fn to_cycle_config(&self) -> Result<CycleConfig, ValidationError> {
        CycleConfig::new(
            self.cycles,
            minutes_to_secs(self.work_minutes),
            minutes_to_secs(self.short_break_minutes),
            minutes_to_secs(self.long_break_minutes),
            minutes_to_secs(self.snooze_minutes),
        )
    }
}

/// Status line appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_filled_mark")]
    pub filled_mark: String,
    #[serde(default = "default_empty_mark")]
    pub empty_mark: String,
    #[serde(default = "default_true")]
    pub show_tasks: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/saturn/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub timer: TimerSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

fn minutes_to_secs(minutes: u64) -> u64 {
    minutes.saturating_mul(60)
}

// Default functions
fn default_cycles() -> u32 {
    4
}
fn default_work_minutes() -> u64 {
    25
}
fn default_short_break_minutes() -> u64 {
    5
}
fn default_long_break_minutes() -> u64 {
    15
}
fn default_snooze_minutes() -> u64 {
    5
}
fn default_filled_mark() -> String {
    "●".into()
}
fn default_empty_mark() -> String {
    "○".into()
}
fn default_true() -> bool {
    true
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            cycles: default_cycles(),
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            snooze_minutes: default_snooze_minutes(),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            filled_mark: default_filled_mark(),
            empty_mark: default_empty_mark(),
            show_tasks: true,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => value
                        .parse::<bool>()
                        .map(serde_json::Value::Bool)
                        .map_err(|e| invalid(e.to_string()))?,
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| {
                            invalid(format!("cannot parse '{value}' as a non-negative integer"))
                        })?,
                    serde_json::Value::Object(_) => return Err(unknown()),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.cycle_config()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, writing defaults");
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key. The change is kept in memory only
    /// when the resulting config is valid; call [`Config::save`] to persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the timer settings it produces are invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json)?;
        updated.cycle_config()?;
        *self = updated;
        Ok(())
    }

    /// The controller configuration these settings describe.
    pub fn cycle_config(&self) -> Result<CycleConfig, ValidationError> {
        self.timer.to_cycle_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[timer]\nwork_minutes = 50\n").unwrap();
        assert_eq!(parsed.timer.work_minutes, 50);
        assert_eq!(parsed.timer.cycles, 4);
        assert_eq!(parsed.display.filled_mark, "●");
    }

    #[test]
    fn negative_duration_is_rejected_by_parser() {
        assert!(toml::from_str::<Config>("[timer]\nwork_minutes = -5\n").is_err());
    }

    #[test]
    fn cycle_config_converts_minutes() {
        let cycle = Config::default().cycle_config().unwrap();
        assert_eq!(cycle.max_cycles(), 4);
        assert_eq!(cycle.work_secs(), 1500);
        assert_eq!(cycle.short_break_secs(), 300);
        assert_eq!(cycle.long_break_secs(), 900);
        assert_eq!(cycle.snooze_secs(), 300);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.cycles").as_deref(), Some("4"));
        assert_eq!(cfg.get("display.empty_mark").as_deref(), Some("○"));
        assert_eq!(cfg.get("display.show_tasks").as_deref(), Some("true"));
        assert!(cfg.get("timer.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_values_by_type() {
        let mut cfg = Config::default();
        cfg.set("timer.work_minutes", "50").unwrap();
        cfg.set("display.show_tasks", "false").unwrap();
        cfg.set("display.filled_mark", "#").unwrap();
        assert_eq!(cfg.timer.work_minutes, 50);
        assert!(!cfg.display.show_tasks);
        assert_eq!(cfg.display.filled_mark, "#");
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("timer.nonexistent", "1"),
            Err(crate::CoreError::Config(ConfigError::UnknownKey(_)))
        ));
        assert!(cfg.set("timer", "1").is_err());
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("display.show_tasks", "not_a_bool").is_err());
        assert!(cfg.set("timer.cycles", "-1").is_err());
        assert!(cfg.set("timer.cycles", "1.5").is_err());
    }

    #[test]
    fn set_rejects_invalid_timer_settings() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("timer.cycles", "0"),
            Err(crate::CoreError::Validation(ValidationError::Zero { field: "max_cycles" }))
        ));
        assert!(matches!(
            cfg.set("timer.cycles", "4000000000"),
            Err(crate::CoreError::Validation(ValidationError::InvalidValue { .. }))
        ));
        assert_eq!(cfg.timer.cycles, 4);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_then_load_preserves_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set("timer.long_break_minutes", "30").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.timer.long_break_minutes, 30);
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timer = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(crate::CoreError::Config(ConfigError::LoadFailed { .. }))
        ));
    }

    #[test]
    fn load_from_rejects_zero_cycles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[timer]\ncycles = 0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
