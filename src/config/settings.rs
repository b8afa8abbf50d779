use crate::datetime::{minutes_or, seconds_or};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Default settings embedded at compile time
pub const DEFAULT_SETTINGS: &str = include_str!("defaults.toml");

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockSettings {
    pub poll_secs: u64,
    pub countdown_secs: u64,
    pub overlay_check_secs: u64,
    pub load_delay_ms: u64,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            poll_secs: 30,
            countdown_secs: 1,
            overlay_check_secs: 10,
            load_delay_ms: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSettings {
    pub source_offset_minutes: i32,
    pub viewer_zone: Option<String>,
    pub viewer_offset_minutes: Option<i32>,
}

impl Default for TimeSettings {
    fn default() -> Self {
        Self {
            source_offset_minutes: crate::datetime::DEFAULT_SOURCE_OFFSET_MINUTES,
            viewer_zone: None,
            viewer_offset_minutes: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectSettings {
    pub lead_seconds: i64,
    pub next_session_buffer_secs: i64,
    pub auto_navigate: bool,
}

impl Default for RedirectSettings {
    fn default() -> Self {
        Self {
            lead_seconds: 15,
            next_session_buffer_secs: 120,
            auto_navigate: false,
        }
    }
}

impl RedirectSettings {
    pub fn next_session_buffer(&self) -> Duration {
        seconds_or(self.next_session_buffer_secs, Self::default().next_session_buffer_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BannerSettings {
    pub ended_delay_secs: i64,
    pub feedback_minutes: i64,
}

impl Default for BannerSettings {
    fn default() -> Self {
        Self {
            ended_delay_secs: 30,
            feedback_minutes: 10,
        }
    }
}

impl BannerSettings {
    pub fn ended_delay(&self) -> Duration {
        seconds_or(self.ended_delay_secs, Self::default().ended_delay_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    pub default_limit: usize,
    pub nested_buffer_minutes: i64,
    pub live_upcoming_hide_minutes: i64,
    pub start_countdown_hide_secs: i64,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            default_limit: crate::models::DEFAULT_LIMIT,
            nested_buffer_minutes: 30,
            live_upcoming_hide_minutes: 30,
            start_countdown_hide_secs: 30,
        }
    }
}

// Out-of-range values from the settings file fall back to the defaults
impl ContainerSettings {
    pub fn nested_buffer(&self) -> Duration {
        minutes_or(self.nested_buffer_minutes, Self::default().nested_buffer_minutes)
    }

    pub fn live_upcoming_hide(&self) -> Duration {
        minutes_or(self.live_upcoming_hide_minutes, Self::default().live_upcoming_hide_minutes)
    }

    pub fn start_countdown_hide(&self) -> Duration {
        seconds_or(self.start_countdown_hide_secs, Self::default().start_countdown_hide_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    pub animations: bool,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self { animations: true }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub clock: ClockSettings,
    pub time: TimeSettings,
    pub redirect: RedirectSettings,
    pub banners: BannerSettings,
    pub containers: ContainerSettings,
    pub board: BoardSettings,
    /// Key string (e.g. "Ctrl-c") → board command name
    pub keys: HashMap<String, String>,
}

impl Settings {
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Built-in defaults; an unparseable embedded file falls back to `Default`
    pub fn builtin() -> Self {
        Self::from_toml(DEFAULT_SETTINGS).unwrap_or_default()
    }

    /// Read an explicit config file. Errors are reported, not swallowed.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings = Self::from_toml(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if settings.keys.is_empty() {
            settings.keys = Self::builtin().keys;
        }
        Ok(settings)
    }

    /// `--config` when given, else the user file, else built-in defaults.
    ///
    /// On first run the defaults are written to the user path so they can be edited.
    pub fn load(override_path: Option<&Path>) -> Result<Self, SettingsError> {
        if let Some(path) = override_path {
            return Self::load_from(path);
        }

        let user_path = get_user_config_path();
        if user_path.exists() {
            return match Self::load_from(&user_path) {
                Ok(settings) => Ok(settings),
                Err(e) => {
                    warn!(error = %e, "ignoring user config, using defaults");
                    Ok(Self::builtin())
                }
            };
        }

        if let Some(parent) = user_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if std::fs::write(&user_path, DEFAULT_SETTINGS).is_ok() {
            debug!(path = %user_path.display(), "wrote default config");
        }
        Ok(Self::builtin())
    }
}

/// Path to the user's config file
pub fn get_user_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agenda-live")
        .join("config.toml")
}
