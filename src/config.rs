//! Application settings
//!
//! Settings are read once at startup from a JSON file in the XDG config
//! directory (`~/.config/pricebook/settings.json` on Linux); a missing or
//! unreadable file yields the defaults. Command-line flags override
//! individual values after loading. Validation beyond sensible defaults
//! (e.g. a minimum TTL) is left to whatever writes the file.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::DEFAULT_TTL_SECS;
use crate::sync::SyncInterval;

/// Default base URL for the Pocket Price API
const DEFAULT_API_URL: &str = "https://api.pocketprice.ru";

/// User-configurable application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the Pocket Price API
    pub api_url: String,
    /// API key sent as a bearer token, if required by the deployment
    pub api_key: Option<String>,
    /// Cache TTL in seconds
    pub cache_ttl_secs: u64,
    /// Background sync interval name (`hourly`, `twicedaily`, `daily`)
    pub sync_interval: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            cache_ttl_secs: DEFAULT_TTL_SECS,
            sync_interval: SyncInterval::Hourly.as_str().to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from the default config path, falling back to defaults
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Path of the settings file in the XDG config directory
    ///
    /// Returns `None` if the directory cannot be determined (e.g. no home
    /// directory).
    pub fn config_path() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "pricebook")?;
        Some(project_dirs.config_dir().join("settings.json"))
    }

    /// Loads settings from a specific file
    ///
    /// Returns `None` when the file is missing or cannot be parsed; the
    /// caller falls back to defaults.
    pub fn load_from(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// The configured sync interval
    ///
    /// Unrecognized names fall back to hourly, matching the default.
    pub fn interval(&self) -> SyncInterval {
        SyncInterval::from_str(&self.sync_interval).unwrap_or(SyncInterval::Hourly)
    }
}
