//! TOML-based application configuration.
//!
//! Stores:
//! - Lock gate reference offset and cutoff
//! - Pole names (which city sits at 0 and which at 100)
//! - Bias band boundaries
//! - State file name
//! - Optional overrides for the quote and playful message pools
//!
//! Configuration is stored at `<data dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gate::{LockGate, DEFAULT_CUTOFF, IST_OFFSET_MINUTES};
use crate::messages;
use crate::storage::state_store::STATE_FILE;
use crate::view::BiasBands;

pub const CONFIG_FILE: &str = "config.toml";

/// Reference zone and daily cutoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
    #[serde(default = "default_cutoff")]
    pub cutoff: String,
}

/// Which city sits at each end of the dial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poles {
    /// Name shown at position 0.
    #[serde(default = "default_low_pole")]
    pub low: String,
    /// Name shown at position 100.
    #[serde(default = "default_high_pole")]
    pub high: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_state_file")]
    pub file: String,
}

/// Message pool overrides. Empty lists use the built-in pools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagesConfig {
    #[serde(default)]
    pub quotes: Vec<String>,
    #[serde(default)]
    pub toward_low: Vec<String>,
    #[serde(default)]
    pub balanced: Vec<String>,
    #[serde(default)]
    pub toward_high: Vec<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub poles: Poles,
    #[serde(default)]
    pub bands: BiasBands,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
}

fn default_utc_offset_minutes() -> i32 {
    IST_OFFSET_MINUTES
}
fn default_cutoff() -> String {
    DEFAULT_CUTOFF.into()
}
fn default_low_pole() -> String {
    "Mumbai".into()
}
fn default_high_pole() -> String {
    "Bangalore".into()
}
fn default_state_file() -> String {
    STATE_FILE.into()
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: default_utc_offset_minutes(),
            cutoff: default_cutoff(),
        }
    }
}

impl Default for Poles {
    fn default() -> Self {
        Self {
            low: default_low_pole(),
            high: default_high_pole(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file: default_state_file(),
        }
    }
}

impl MessagesConfig {
    pub fn quotes(&self) -> Vec<String> {
        pick(&self.quotes, messages::QUOTES)
    }

    pub fn toward_low(&self) -> Vec<String> {
        pick(&self.toward_low, messages::TOWARD_LOW)
    }

    pub fn balanced(&self) -> Vec<String> {
        pick(&self.balanced, messages::BALANCED)
    }

    pub fn toward_high(&self) -> Vec<String> {
        pick(&self.toward_high, messages::TOWARD_HIGH)
    }
}

fn pick(configured: &[String], builtin: &[&str]) -> Vec<String> {
    if configured.is_empty() {
        builtin.iter().map(|s| (*s).to_string()).collect()
    } else {
        configured.to_vec()
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
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<i64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?,
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

        Err(unknown())
    }

    /// Config file location inside a data directory.
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE)
    }

    /// Load from `path`, or write and return defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// fails validation, or if the default config cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
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

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Check cross-field constraints serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        LockGate::from_config(&self.gate)?;
        self.bands.validate()?;
        if self.poles.low.trim().is_empty() || self.poles.high.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "poles".into(),
                message: "pole names must not be empty".into(),
            });
        }
        if self.store.file.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "store.file".into(),
                message: "state file name must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Build the lock gate described by `[gate]`.
    ///
    /// # Errors
    ///
    /// See [`LockGate::from_config`].
    pub fn lock_gate(&self) -> Result<LockGate, ConfigError> {
        LockGate::from_config(&self.gate)
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

    /// Set a config value by key. The result must still validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed
    /// into the existing type, or the updated config fails validation.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}
