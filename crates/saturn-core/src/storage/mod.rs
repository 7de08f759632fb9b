mod config;

pub use config::{Config, DisplaySettings, TimerSettings};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/saturn[-dev]/` based on SATURN_ENV.
///
/// Set SATURN_ENV=dev to use a development config directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("SATURN_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("saturn-dev")
    } else {
        base_dir.join("saturn")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
