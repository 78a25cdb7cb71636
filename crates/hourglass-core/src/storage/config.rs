//! JSON configuration file.
//!
//! Stores everything needed to rebuild the engine after a restart:
//! - Date of birth for Life mode
//! - Countdown duration and remaining time
//! - Deadline target and the instant it was set
//! - Dashboard settings (lifespan, frame rate, checkpoint interval)
//!
//! Configuration is stored at `<config dir>/hourglass/config.json`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{config_path, StateStore};
use crate::calendar::DEFAULT_LIFESPAN_YEARS;
use crate::error::{ConfigError, CoreError, Result};

/// Persisted countdown. Only the remaining time is kept; a countdown that
/// was started is rebuilt paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownRecord {
    pub duration_seconds: u64,
    pub remaining_seconds: u64,
    /// Started at least once since it was configured or rewound.
    #[serde(default)]
    pub started: bool,
}

/// Persisted deadline. Remaining time is recomputed from `target` on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineRecord {
    pub target: DateTime<Utc>,
    pub set_at: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub running: bool,
}

/// Dashboard settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_lifespan_years")]
    pub lifespan_years: u32,
    /// Frames per second of the interactive dashboard.
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Seconds between saves while a countdown is running.
    #[serde(default = "default_checkpoint_secs")]
    pub checkpoint_secs: u64,
}

/// Everything the engine writes to the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown_timer: Option<CountdownRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_timer: Option<DeadlineRecord>,
    #[serde(default)]
    pub settings: Settings,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_lifespan_years() -> u32 {
    DEFAULT_LIFESPAN_YEARS
}
fn default_frame_rate() -> u32 {
    24
}
fn default_checkpoint_secs() -> u64 {
    5
}

/// Accepted range of `settings.lifespan_years`.
pub const LIFESPAN_YEARS_RANGE: std::ops::RangeInclusive<u32> = 1..=200;

impl Settings {
    /// # Errors
    ///
    /// `InvalidValue` for a lifespan outside [`LIFESPAN_YEARS_RANGE`].
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !LIFESPAN_YEARS_RANGE.contains(&self.lifespan_years) {
            return Err(ConfigError::InvalidValue {
                key: "settings.lifespan_years".to_string(),
                message: format!(
                    "must be between {} and {}",
                    LIFESPAN_YEARS_RANGE.start(),
                    LIFESPAN_YEARS_RANGE.end()
                ),
            });
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lifespan_years: default_lifespan_years(),
            frame_rate: default_frame_rate(),
            checkpoint_secs: default_checkpoint_secs(),
        }
    }
}

impl PersistedState {
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

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown().into());
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
                        .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown().into())
    }

    /// Get a value as string by dot-separated key, e.g. `settings.frame_rate`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set an existing value by dot-separated key. The new value must parse
    /// as the type already stored there.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.settings.validate()?;
        *self = updated;
        Ok(())
    }
}

/// [`StateStore`] backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default [`config_path`].
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(config_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load from disk, returning defaults on any error.
    /// This is a convenience method that never fails.
    pub fn load_or_default(&self) -> PersistedState {
        match self.load() {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                warn!(error = %e, "using default configuration");
                PersistedState::default()
            }
        }
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<PersistedState>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::LoadFailed {
                    path: self.path.clone(),
                    source,
                }
                .into())
            }
        };

        match serde_json::from_str::<PersistedState>(&content) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable configuration");
                Ok(None)
            }
        }
    }

    fn save(&self, state: &PersistedState) -> Result<()> {
        let content = serde_json::to_string_pretty(state)?;
        write_atomically(&self.path, &content).map_err(|source| {
            CoreError::from(ConfigError::SaveFailed {
                path: self.path.clone(),
                source,
            })
        })?;
        debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }
}

/// Write to a sibling temp file and rename over the target, so a reader
/// never sees a half-written document.
fn write_atomically(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)
}
