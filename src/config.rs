//! Application configuration.
//!
//! The configuration is loaded from a JSON file whose path is passed on the
//! command line (`--config <path>`) or found at
//! `$XDG_CONFIG_HOME/poshud/config.json`.  The top-level schema uses a
//! `"settings"` key for profiles and a `"monitor"` key for target polling,
//! so the file can grow further sections without breaking older files.
//!
//! # Example
//!
//! ```json
//! {
//!   "settings": {
//!     "selected_profile": "wheel",
//!     "profiles": {
//!       "wheel": {
//!         "name": "Wheel",
//!         "position_count": 8,
//!         "labels": ["Pos1", "", "Pos3", "", "Pos5", "", "Pos7", ""],
//!         "layout": "Grid",
//!         "grid_rows": 2,
//!         "grid_columns": 4,
//!         "target_executable": "C:\\Games\\Sim\\sim.exe"
//!       }
//!     }
//!   },
//!   "monitor": { "poll_interval_ms": 1000 }
//! }
//! ```

use crate::profile::{AppSettings, Profile};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration.
///
/// Every field is optional. A minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Profiles and the selected profile.
    #[serde(default)]
    pub settings: AppSettings,

    /// Target process polling.
    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Target process polling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// How often the process list is checked (ms).  Values below 50 are
    /// raised to 50.
    pub poll_interval_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
        }
    }
}

impl MonitorConfig {
    /// Smallest poll interval we accept.
    pub const MIN_POLL_INTERVAL_MS: u64 = 50;

    /// The poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(Self::MIN_POLL_INTERVAL_MS))
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    ///
    /// The result has already been through [`Config::prepare`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        Self::parse(&contents)
            .map_err(|ConfigError(e)| ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration from a JSON string and prepare it.
    pub fn parse(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError(format!("failed to parse: {}", e)))?;
        config.prepare()?;
        Ok(config)
    }

    /// Fill in a default profile when none is configured, then normalise,
    /// repair and validate every profile.
    pub fn prepare(&mut self) -> Result<(), ConfigError> {
        if self.settings.profiles.is_empty() {
            self.settings
                .profiles
                .insert("default".into(), Profile::default());
        }
        self.settings
            .prepare()
            .map_err(|(id, e)| ConfigError(format!("profile {}: {}", id, e)))
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
