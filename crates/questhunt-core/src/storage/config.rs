//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Geolocation watch options (accuracy, cached fix age, timeout)
//! - Feedback switches (audio, haptics) and the cue cadence window
//! - Where the validation service lives
//! - An optional custom quest catalog
//!
//! Configuration is stored at `~/.config/questhunt/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::data_dir;
use crate::error::ConfigError;
use crate::feedback::DEFAULT_CADENCE_BASE_MS;
use crate::geo::WatchOptions;

/// Feedback configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default = "default_true")]
    pub audio_enabled: bool,
    #[serde(default = "default_true")]
    pub haptics_enabled: bool,
    /// Cadence window; a tier with bip rate `n` plays a cue every
    /// `cadence_base_ms / n` milliseconds.
    #[serde(default = "default_cadence_base_ms")]
    pub cadence_base_ms: u64,
}

/// Remote validation service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/questhunt/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub geolocation: WatchOptions,
    #[serde(default)]
    pub feedback: FeedbackConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Custom catalog file replacing the built-in quests.
    #[serde(default)]
    pub catalog_path: Option<String>,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_cadence_base_ms() -> u64 {
    DEFAULT_CADENCE_BASE_MS
}
fn default_base_url() -> String {
    "http://localhost:3000".into()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            audio_enabled: true,
            haptics_enabled: true,
            cadence_base_ms: default_cadence_base_ms(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            geolocation: WatchOptions::default(),
            feedback: FeedbackConfig::default(),
            validation: ValidationConfig::default(),
            catalog_path: None,
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
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|e| invalid(e.to_string()))?
                            .into(),
                    ),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("not a leaf key".into()));
                    }
                    // Empty clears optional keys; required strings reject it on decode.
                    _ if value.is_empty() => serde_json::Value::Null,
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "writing default configuration");
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
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

    /// Set a config value by key, in memory. Call `save()` to persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.geolocation.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "geolocation.timeout_ms".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.feedback.cadence_base_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "feedback.cadence_base_ms".into(),
                message: "must be at least 1".into(),
            });
        }
        if let Err(e) = url::Url::parse(&self.validation.base_url) {
            return Err(ConfigError::InvalidValue {
                key: "validation.base_url".into(),
                message: e.to_string(),
            });
        }
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
