//! TOML-based user preferences.
//!
//! Stores the settings the practice core reads:
//! - Rest gap between steps
//! - Transition cue (beep, vibration, delay)
//! - Whether the mood check is shown, per practice type
//!
//! Preferences live at `<data dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::{PracticeType, TimingSettings, TransitionSettings};

/// Upper bound for `transition.volume`.
const MAX_VOLUME: u32 = 100;

/// Practice pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeConfig {
    /// Rest between steps in seconds; 0 disables rest.
    #[serde(default = "default_rest")]
    pub rest_duration_secs: u64,
}

/// Mood check prompts, per practice type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodCheckConfig {
    #[serde(default = "default_true")]
    pub yoga: bool,
    #[serde(default = "default_true")]
    pub breathing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub practice: PracticeConfig,
    #[serde(default)]
    pub transition: TransitionSettings,
    #[serde(default)]
    pub mood_check: MoodCheckConfig,
}

fn default_rest() -> u64 {
    10
}
fn default_true() -> bool {
    true
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            rest_duration_secs: default_rest(),
        }
    }
}

impl Default for MoodCheckConfig {
    fn default() -> Self {
        Self {
            yoga: true,
            breathing: true,
        }
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            practice: PracticeConfig::default(),
            transition: TransitionSettings::default(),
            mood_check: MoodCheckConfig::default(),
        }
    }
}

impl Preferences {
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
        if key.is_empty() {
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
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) => {
                        return Err(invalid("cannot overwrite a section".into()));
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

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default preferences cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(_) => {
                let prefs = Self::default();
                prefs.save_to(path)?;
                Ok(prefs)
            }
        }
    }

    /// Load, falling back to defaults on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load preferences; using defaults");
            Self::default()
        })
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the preferences cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key, in memory only.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value has the wrong type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        if updated.transition.volume > MAX_VOLUME {
            return Err(invalid(format!("must be between 0 and {MAX_VOLUME}")));
        }
        *self = updated;
        Ok(())
    }

    pub fn timing(&self) -> TimingSettings {
        TimingSettings {
            rest_secs: self.practice.rest_duration_secs,
            transition_delay_secs: self.transition.delay_secs,
        }
    }

    pub fn mood_check_enabled(&self, practice_type: PracticeType) -> bool {
        match practice_type {
            PracticeType::Yoga => self.mood_check.yoga,
            PracticeType::Breathing => self.mood_check.breathing,
        }
    }

    pub fn set_mood_check_enabled(&mut self, practice_type: PracticeType, enabled: bool) {
        match practice_type {
            PracticeType::Yoga => self.mood_check.yoga = enabled,
            PracticeType::Breathing => self.mood_check.breathing = enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_preferences_roundtrip() {
        let prefs = Preferences::default();
        let toml_str = toml::to_string_pretty(&prefs).unwrap();
        let parsed: Preferences = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, prefs);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Preferences = toml::from_str("[practice]\nrest_duration_secs = 0\n").unwrap();
        assert_eq!(parsed.practice.rest_duration_secs, 0);
        assert_eq!(parsed.transition.delay_secs, 3);
        assert!(parsed.mood_check.breathing);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let prefs = Preferences::default();
        assert_eq!(prefs.get("transition.beep_enabled").as_deref(), Some("true"));
        assert_eq!(prefs.get("practice.rest_duration_secs").as_deref(), Some("10"));
        assert!(prefs.get("transition.missing_key").is_none());
        assert!(prefs.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut prefs = Preferences::default();
        prefs.set("transition.volume", "75").unwrap();
        prefs.set("mood_check.yoga", "false").unwrap();
        assert_eq!(prefs.transition.volume, 75);
        assert!(!prefs.mood_check_enabled(PracticeType::Yoga));
        assert!(prefs.mood_check_enabled(PracticeType::Breathing));
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_types() {
        let mut prefs = Preferences::default();
        assert!(matches!(
            prefs.set("transition.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            prefs.set("transition.beep_enabled", "loud"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            prefs.set("transition", "1"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(prefs.set("practice.rest_duration_secs", "-3").is_err());
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn timing_reads_rest_and_delay() {
        let mut prefs = Preferences::default();
        prefs.practice.rest_duration_secs = 15;
        prefs.transition.delay_secs = 5;
        let timing = prefs.timing();
        assert_eq!(timing.rest_secs, 15);
        assert_eq!(timing.transition_delay_secs, 5);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let prefs = Preferences::load_from(&path).unwrap();
        assert_eq!(prefs, Preferences::default());
        assert!(path.exists());

        let mut changed = prefs.clone();
        changed.set_mood_check_enabled(PracticeType::Breathing, false);
        changed.save_to(&path).unwrap();
        assert_eq!(Preferences::load_from(&path).unwrap(), changed);
    }

    #[test]
    fn volume_above_max_is_rejected() {
        let mut prefs = Preferences::default();
        prefs.set("transition.volume", "100").unwrap();
        assert_eq!(prefs.transition.volume, 100);

        let err = prefs.set("transition.volume", "101").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "transition.volume"));
        assert_eq!(prefs.transition.volume, 100);
    }

    #[test]
    fn load_from_corrupt_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "practice = [").unwrap();
        assert!(matches!(
            Preferences::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
