// SPDX-License-Identifier: MPL-2.0
//! Configuration for notification timing, including loading and saving
//! user preferences to a `settings.toml` file.
//!
//! All values are optional in the file; missing or out-of-range entries fall
//! back to the defaults below. [`Config::delays`] resolves the raw settings
//! into the [`Delays`] value type consumed by the engine.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

const CONFIG_FILE: &str = "settings.toml";
const APP_NAME: &str = "NotifyStack";

/// Default eviction delay after a notification completes successfully (seconds).
pub const DEFAULT_COMPLETED_EVICTION_SECS: f32 = 2.0;

/// Default eviction delay after a notification fails (seconds).
pub const DEFAULT_FAILED_EVICTION_SECS: f32 = 3.0;

/// Default visible duration for transient notifications (seconds).
pub const DEFAULT_TRANSIENT_VISIBLE_SECS: f32 = 3.0;

/// Valid range for eviction and visibility delays (seconds).
pub mod delay_bounds {
    /// Minimum delay in seconds.
    pub const MIN_SECS: f32 = 0.0;
    /// Maximum delay in seconds.
    pub const MAX_SECS: f32 = 600.0;
}

/// Minimum extra visibility a failed notification gets over a completed one.
const FAILED_EXTRA_MIN: Duration = Duration::from_millis(500);

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub completed_eviction_secs: Option<f32>,
    #[serde(default)]
    pub failed_eviction_secs: Option<f32>,
    #[serde(default)]
    pub transient_visible_secs: Option<f32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            completed_eviction_secs: Some(DEFAULT_COMPLETED_EVICTION_SECS),
            failed_eviction_secs: Some(DEFAULT_FAILED_EVICTION_SECS),
            transient_visible_secs: Some(DEFAULT_TRANSIENT_VISIBLE_SECS),
        }
    }
}

impl Config {
    /// Resolves the raw settings into validated [`Delays`].
    #[must_use]
    pub fn delays(&self) -> Delays {
        Delays::new(
            duration_from_secs(
                self.completed_eviction_secs,
                DEFAULT_COMPLETED_EVICTION_SECS,
            ),
            duration_from_secs(self.failed_eviction_secs, DEFAULT_FAILED_EVICTION_SECS),
            duration_from_secs(self.transient_visible_secs, DEFAULT_TRANSIENT_VISIBLE_SECS),
        )
    }
}

/// Resolved notification timing.
///
/// A failed notification must stay visible strictly longer than a completed
/// one (reading an error takes longer than recognizing success), so the
/// constructor raises the failed delay when a configuration violates that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delays {
    completed: Duration,
    failed: Duration,
    transient: Duration,
}

impl Delays {
    /// Creates a new set of delays, enforcing `failed > completed`.
    #[must_use]
    pub fn new(completed: Duration, failed: Duration, transient: Duration) -> Self {
        let failed = if failed <= completed {
            let raised = completed + FAILED_EXTRA_MIN;
            warn!(
                configured_secs = failed.as_secs_f32(),
                raised_secs = raised.as_secs_f32(),
                "failed-eviction delay must exceed the completed delay; raising it"
            );
            raised
        } else {
            failed
        };
        Self {
            completed,
            failed,
            transient,
        }
    }

    /// Delay before an auto-evicted completed notification disappears.
    #[must_use]
    pub fn completed(self) -> Duration {
        self.completed
    }

    /// Delay before an auto-evicted failed notification disappears.
    #[must_use]
    pub fn failed(self) -> Duration {
        self.failed
    }

    /// How long a transient notification stays visible.
    #[must_use]
    pub fn transient(self) -> Duration {
        self.transient
    }
}

impl Default for Delays {
    fn default() -> Self {
        Self::new(
            Duration::from_secs_f32(DEFAULT_COMPLETED_EVICTION_SECS),
            Duration::from_secs_f32(DEFAULT_FAILED_EVICTION_SECS),
            Duration::from_secs_f32(DEFAULT_TRANSIENT_VISIBLE_SECS),
        )
    }
}

/// Converts an optional seconds value into a `Duration`, clamping to the
/// valid range and substituting the default for missing or non-finite input.
fn duration_from_secs(secs: Option<f32>, default_secs: f32) -> Duration {
    let secs = secs
        .filter(|s| s.is_finite())
        .map(|s| s.clamp(delay_bounds::MIN_SECS, delay_bounds::MAX_SECS))
        .unwrap_or(default_secs);
    Duration::from_secs_f32(secs)
}

fn get_default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path.push(CONFIG_FILE);
        path
    })
}

pub fn load() -> Result<Config> {
    if let Some(path) = get_default_config_path() {
        if path.exists() {
            return load_from_path(&path);
        }
    }
    Ok(Config::default())
}

pub fn save(config: &Config) -> Result<()> {
    if let Some(path) = get_default_config_path() {
        return save_to_path(config, &path);
    }
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content).unwrap_or_default())
}

pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip_preserves_delays() {
        let config = Config {
            completed_eviction_secs: Some(1.5),
            failed_eviction_secs: Some(4.0),
            transient_visible_secs: Some(2.5),
        };
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        save_to_path(&config, &config_path).expect("failed to save config");
        let loaded = load_from_path(&config_path).expect("failed to load config");

        assert_eq!(loaded.completed_eviction_secs, Some(1.5));
        assert_eq!(loaded.failed_eviction_secs, Some(4.0));
        assert_eq!(loaded.transient_visible_secs, Some(2.5));
    }

    #[test]
    fn load_from_path_returns_default_on_invalid_toml() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "not = valid = toml").expect("failed to write invalid toml");

        let loaded = load_from_path(&config_path).expect("load should not error");
        assert_eq!(
            loaded.completed_eviction_secs,
            Some(DEFAULT_COMPLETED_EVICTION_SECS)
        );
    }

    #[test]
    fn save_to_path_creates_parent_directories() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let nested_dir = temp_dir.path().join("deep").join("path");
        let config_path = nested_dir.join("settings.toml");

        save_to_path(&Config::default(), &config_path).expect("save should create directories");
        assert!(config_path.exists());
    }

    #[test]
    fn default_delays_follow_documented_constants() {
        let delays = Delays::default();
        assert_eq!(delays.completed(), Duration::from_secs(2));
        assert_eq!(delays.failed(), Duration::from_secs(3));
        assert_eq!(delays.transient(), Duration::from_secs(3));
    }

    #[test]
    fn failed_delay_always_exceeds_completed_delay() {
        let delays = Delays::new(
            Duration::from_secs(5),
            Duration::from_secs(1),
            Duration::from_secs(3),
        );
        assert!(delays.failed() > delays.completed());
    }

    #[test]
    fn delays_resolution_substitutes_defaults_for_invalid_values() {
        let config = Config {
            completed_eviction_secs: Some(f32::NAN),
            failed_eviction_secs: None,
            transient_visible_secs: Some(-10.0),
        };
        let delays = config.delays();
        assert_eq!(
            delays.completed(),
            Duration::from_secs_f32(DEFAULT_COMPLETED_EVICTION_SECS)
        );
        assert_eq!(
            delays.failed(),
            Duration::from_secs_f32(DEFAULT_FAILED_EVICTION_SECS)
        );
        // Negative values clamp to the minimum rather than falling back.
        assert_eq!(delays.transient(), Duration::ZERO);
    }

    #[test]
    fn delays_resolution_clamps_oversized_values() {
        let config = Config {
            completed_eviction_secs: Some(1e9),
            failed_eviction_secs: None,
            transient_visible_secs: None,
        };
        let delays = config.delays();
        assert_eq!(
            delays.completed(),
            Duration::from_secs_f32(delay_bounds::MAX_SECS)
        );
    }
}
