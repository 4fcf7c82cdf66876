//! TOML-based challenge configuration.
//!
//! Stores:
//! - Schedule window and recompute cadence
//! - Event history size
//! - Premium membership and reward multiplier
//!
//! Configuration is stored at `~/.config/snapchef/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::challenge::RewardPolicy;
use crate::error::{ConfigError, ValidationError};

/// Active-set regeneration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Days of history regenerated behind today.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default = "default_recompute_interval_secs")]
    pub recompute_interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Capacity of the submitted-event ring buffer.
    #[serde(default = "default_event_history")]
    pub event_history: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardsConfig {
    #[serde(default)]
    pub premium: bool,
    #[serde(default = "default_premium_multiplier")]
    pub premium_multiplier: u32,
}

/// Challenge configuration.
///
/// Serialized to/from TOML at `~/.config/snapchef/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChallengeConfig {
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub rewards: RewardsConfig,
}

fn default_window_days() -> u32 {
    crate::active::DEFAULT_WINDOW_DAYS
}
fn default_recompute_interval_secs() -> u64 {
    60
}
fn default_event_history() -> usize {
    100
}
fn default_premium_multiplier() -> u32 {
    2
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            recompute_interval_secs: default_recompute_interval_secs(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            event_history: default_event_history(),
        }
    }
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            premium: false,
            premium_multiplier: default_premium_multiplier(),
        }
    }
}

impl ChallengeConfig {
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

        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        for part in parents.into_iter().flat_map(|p| p.split('.')) {
            current = current.get_mut(part).ok_or_else(unknown)?;
        }
        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(e.to_string()))?,
            ),
            serde_json::Value::Number(_) => value
                .parse::<u64>()
                .map(|n| serde_json::Value::Number(n.into()))
                .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => return Err(unknown()),
            _ => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// `~/.config/snapchef[-dev]/config.toml`.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
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
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| failed(e.to_string()))
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key in memory. The result is validated;
    /// on failure `self` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not parse
    /// or validate.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: ChallengeConfig =
            serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate().map_err(|e| invalid(e.to_string()))?;
        *self = updated;
        Ok(())
    }

    /// Every leaf key with its current value, sorted by key.
    pub fn entries(&self) -> Vec<(String, String)> {
        fn walk(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
            match value {
                serde_json::Value::Object(map) => {
                    for (k, v) in map {
                        let key = if prefix.is_empty() {
                            k.clone()
                        } else {
                            format!("{prefix}.{k}")
                        };
                        walk(&key, v, out);
                    }
                }
                other => out.push((prefix.to_string(), other.to_string())),
            }
        }

        let mut out = Vec::new();
        if let Ok(json) = serde_json::to_value(self) {
            walk("", &json, &mut out);
        }
        out
    }

    /// Reject values the board cannot run with.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let non_positive = |field: &str| ValidationError::NonPositive {
            field: field.to_string(),
        };
        if self.schedule.window_days == 0 {
            return Err(non_positive("schedule.window_days"));
        }
        if self.schedule.recompute_interval_secs == 0 {
            return Err(non_positive("schedule.recompute_interval_secs"));
        }
        if self.tracking.event_history == 0 {
            return Err(non_positive("tracking.event_history"));
        }
        if self.rewards.premium_multiplier == 0 {
            return Err(ValidationError::InvalidValue {
                field: "rewards.premium_multiplier".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn reward_policy(&self) -> RewardPolicy {
        RewardPolicy {
            premium: self.rewards.premium,
            premium_multiplier: self.rewards.premium_multiplier,
        }
    }

    pub fn recompute_interval(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.schedule.recompute_interval_secs.min(i64::MAX as u64) as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn default_config_roundtrip() {
        let cfg = ChallengeConfig::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ChallengeConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.schedule.window_days, 14);
        assert_eq!(parsed.rewards.premium_multiplier, 2);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: ChallengeConfig = toml::from_str(indoc! {r#"
            [rewards]
            premium = true
        "#})
        .unwrap();
        assert!(cfg.rewards.premium);
        assert_eq!(cfg.rewards.premium_multiplier, 2);
        assert_eq!(cfg.schedule.recompute_interval_secs, 60);
        assert_eq!(cfg.tracking.event_history, 100);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = ChallengeConfig::default();
        assert_eq!(cfg.get("schedule.window_days").as_deref(), Some("14"));
        assert_eq!(cfg.get("rewards.premium").as_deref(), Some("false"));
        assert!(cfg.get("schedule").is_none());
        assert!(cfg.get("schedule.missing_key").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = ChallengeConfig::default();
        cfg.set("rewards.premium", "true").unwrap();
        cfg.set("tracking.event_history", "25").unwrap();
        assert!(cfg.rewards.premium);
        assert_eq!(cfg.tracking.event_history, 25);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = ChallengeConfig::default();
        assert!(matches!(
            cfg.set("rewards.gems", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("rewards", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_rejects_invalid_values_without_mutating() {
        let mut cfg = ChallengeConfig::default();
        assert!(cfg.set("rewards.premium", "maybe").is_err());
        assert!(cfg.set("schedule.window_days", "-3").is_err());
        assert!(cfg.set("schedule.window_days", "0").is_err());
        assert_eq!(cfg, ChallengeConfig::default());
    }

    #[test]
    fn validate_catches_zero_values() {
        let mut cfg = ChallengeConfig::default();
        assert!(cfg.validate().is_ok());
        cfg.rewards.premium_multiplier = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn entries_list_every_leaf() {
        let keys: Vec<String> = ChallengeConfig::default()
            .entries()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert!(keys.contains(&"schedule.window_days".to_string()));
        assert!(keys.contains(&"rewards.premium_multiplier".to_string()));
        assert_eq!(keys.len(), 5);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = ChallengeConfig::load_from(&path).unwrap();
        assert_eq!(cfg, ChallengeConfig::default());
        assert!(path.exists());

        std::fs::write(&path, "[schedule]\nwindow_days = \"lots\"\n").unwrap();
        assert!(matches!(
            ChallengeConfig::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
