// ABOUTME: Persisted launcher preferences and their resolution against detection.
// ABOUTME: Handles YAML load/save at the per-user path and the override precedence merge.

mod deserialize;
mod resolve;

pub use resolve::{EffectiveConfig, OverrideRecord, Source, Sources, resolve, resolve_with_sources};

use crate::error::{Error, Result};
use crate::types::{Audio, Display, Gpu, Runtime};
use deserialize::{deserialize_choice, serialize_choice};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_DIR: &str = "craftpod";
pub const CONFIG_FILENAME: &str = "config.yaml";
/// Environment variable naming an alternate preference file.
pub const CONFIG_ENV: &str = "CRAFTPOD_CONFIG";

/// Saved user choices. `None` means "no preference, use detection".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    #[serde(
        default,
        deserialize_with = "deserialize_choice",
        serialize_with = "serialize_choice"
    )]
    pub runtime: Option<Runtime>,

    #[serde(
        default,
        deserialize_with = "deserialize_choice",
        serialize_with = "serialize_choice"
    )]
    pub gpu: Option<Gpu>,

    #[serde(
        default,
        deserialize_with = "deserialize_choice",
        serialize_with = "serialize_choice"
    )]
    pub display: Option<Display>,

    #[serde(
        default,
        deserialize_with = "deserialize_choice",
        serialize_with = "serialize_choice"
    )]
    pub audio: Option<Audio>,

    #[serde(default = "default_auto_xhost")]
    pub auto_xhost: bool,

    #[serde(default = "default_stop_timeout", with = "humantime_serde")]
    pub stop_timeout: Duration,
}

fn default_auto_xhost() -> bool {
    true
}

fn default_stop_timeout() -> Duration {
    Duration::from_secs(5)
}

impl Default for PreferenceRecord {
    fn default() -> Self {
        Self {
            runtime: None,
            gpu: None,
            display: None,
            audio: None,
            auto_xhost: default_auto_xhost(),
            stop_timeout: default_stop_timeout(),
        }
    }
}

impl PreferenceRecord {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(Error::from)
    }

    /// Parse a document key by key, dropping each key whose value cannot be used.
    ///
    /// Only a document that is not a YAML mapping fails as a whole.
    pub fn from_yaml_lenient(yaml: &str) -> Result<(Self, Vec<RejectedKey>)> {
        if yaml.trim().is_empty() {
            return Ok((Self::default(), Vec::new()));
        }

        let document = match serde_yaml::from_str::<Value>(yaml)? {
            Value::Null => return Ok((Self::default(), Vec::new())),
            Value::Mapping(document) => document,
            _ => {
                return Err(Error::Yaml(serde::de::Error::custom(
                    "preferences must be a mapping of keys to values",
                )));
            }
        };
        let mut usable = Mapping::new();
        let mut rejected = Vec::new();

        for (key, value) in document {
            let mut single = Mapping::new();
            single.insert(key.clone(), value.clone());
            match serde_yaml::from_value::<Self>(Value::Mapping(single)) {
                Ok(_) => {
                    usable.insert(key, value);
                }
                Err(e) => rejected.push(RejectedKey {
                    key: key.as_str().unwrap_or("<non-string key>").to_string(),
                    reason: e.to_string(),
                }),
            }
        }

        let record = serde_yaml::from_value(Value::Mapping(usable))?;
        Ok((record, rejected))
    }

    /// Layer command-line choices over these preferences.
    ///
    /// Fields the user never chose stay unset so they keep following detection.
    pub fn with_overrides(&self, overrides: &OverrideRecord) -> Self {
        Self {
            runtime: overrides.runtime.or(self.runtime),
            gpu: overrides.gpu.or(self.gpu),
            display: overrides.display.or(self.display),
            audio: overrides.audio.or(self.audio),
            ..self.clone()
        }
    }
}

/// A preference key left out of a lenient load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedKey {
    pub key: String,
    pub reason: String,
}

/// Location of the preference document on disk.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Pick the preference file: explicit path, then `CRAFTPOD_CONFIG`, then the
    /// per-user config directory.
    pub fn locate(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Ok(Self::new(path));
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Ok(Self::new(PathBuf::from(path)));
        }

        dirs::config_dir()
            .map(|dir| Self::new(dir.join(APP_DIR).join(CONFIG_FILENAME)))
            .ok_or(Error::NoConfigDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load saved preferences. A missing file yields the defaults.
    pub fn load(&self) -> Result<PreferenceRecord> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no saved preferences");
            return Ok(PreferenceRecord::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        PreferenceRecord::from_yaml(&content).map_err(|e| self.invalid(e))
    }

    /// Load saved preferences, keeping every usable key of a partly invalid file.
    pub fn load_lenient(&self) -> Result<(PreferenceRecord, Vec<RejectedKey>)> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no saved preferences");
            return Ok((PreferenceRecord::default(), Vec::new()));
        }

        let content = std::fs::read_to_string(&self.path)?;
        PreferenceRecord::from_yaml_lenient(&content).map_err(|e| self.invalid(e))
    }

    fn invalid(&self, e: Error) -> Error {
        match e {
            Error::Yaml(source) => Error::InvalidPreferences {
                path: self.path.clone(),
                source,
            },
            other => other,
        }
    }

    /// Write every preference key, creating the parent directory if needed.
    pub fn save(&self, preferences: &PreferenceRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, preferences.to_yaml()?)?;
        tracing::info!(path = %self.path.display(), "saved preferences");
        Ok(())
    }

    /// Delete the preference file. Succeeds if it was already absent.
    pub fn reset(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
