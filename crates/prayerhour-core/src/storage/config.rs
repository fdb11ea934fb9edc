//! TOML-based host configuration.
//!
//! Stores how the host drives the cycle:
//! - Default step duration
//! - Frame interval of the render loop
//! - How often an in-progress session is checkpointed
//!
//! User preferences (audio, colour, wake lock) are not here; they live in
//! the session store next to the snapshot. Configuration is stored at
//! `~/.config/prayerhour/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::data_dir;
use crate::cycle::DEFAULT_STEP_DURATION_SECS;
use crate::error::{ConfigError, CoreError};

/// Host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_step_duration")]
    pub step_duration_secs: u32,
    /// Delay between frames of the host render loop.
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
    /// How often a running session is snapshotted. 0 disables it.
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval_secs: u64,
}

fn default_step_duration() -> u32 {
    DEFAULT_STEP_DURATION_SECS
}
fn default_frame_interval() -> u64 {
    16
}
fn default_checkpoint_interval() -> u64 {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            step_duration_secs: default_step_duration(),
            frame_interval_ms: default_frame_interval(),
            checkpoint_interval_secs: default_checkpoint_interval(),
        }
    }
}

/// Validate an external step-duration override.
///
/// Accepts only a positive integer number of seconds; anything else yields
/// `None` so the caller keeps its default.
pub fn parse_step_duration(raw: &str) -> Option<u32> {
    match raw.trim().parse::<u32>() {
        Ok(secs) if secs > 0 => Some(secs),
        _ => None,
    }
}

impl AppConfig {
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

    pub fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: AppConfig = toml::from_str(&content).map_err(|e| {
                    ConfigError::LoadFailed {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    }
                })?;
                Ok(cfg.validated())
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!("using default configuration: {e}");
            Self::default()
        })
    }

    /// Get a config value as string by key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a numeric config value by key (in memory; call `save` to persist).
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value is not a valid
    /// non-negative integer for it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.to_string(),
        };
        match key {
            "step_duration_secs" => {
                self.step_duration_secs =
                    parse_step_duration(value).ok_or_else(|| invalid("expected a positive integer"))?;
            }
            "frame_interval_ms" => {
                let ms = value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| invalid("expected an integer"))?;
                if ms == 0 {
                    return Err(invalid("must be greater than zero"));
                }
                self.frame_interval_ms = ms;
            }
            "checkpoint_interval_secs" => {
                self.checkpoint_interval_secs = value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| invalid("expected an integer"))?;
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    fn validated(mut self) -> Self {
        if self.step_duration_secs == 0 {
            warn!("step_duration_secs must be positive, using default");
            self.step_duration_secs = default_step_duration();
        }
        if self.frame_interval_ms == 0 {
            warn!("frame_interval_ms must be positive, using default");
            self.frame_interval_ms = default_frame_interval();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = AppConfig::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.step_duration_secs, 300);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let parsed: AppConfig = toml::from_str("step_duration_secs = 60").unwrap();
        assert_eq!(parsed.step_duration_secs, 60);
        assert_eq!(parsed.frame_interval_ms, 16);
        assert_eq!(parsed.checkpoint_interval_secs, 5);
    }

    #[test]
    fn parse_step_duration_accepts_only_positive_integers() {
        assert_eq!(parse_step_duration("120"), Some(120));
        assert_eq!(parse_step_duration(" 45 "), Some(45));
        assert_eq!(parse_step_duration("0"), None);
        assert_eq!(parse_step_duration("-5"), None);
        assert_eq!(parse_step_duration("1.5"), None);
        assert_eq!(parse_step_duration("abc"), None);
        assert_eq!(parse_step_duration(""), None);
    }

    #[test]
    fn load_writes_defaults_when_missing_and_validates_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert!(path.exists());

        std::fs::write(&path, "step_duration_secs = 0\nframe_interval_ms = 0").unwrap();
        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.step_duration_secs, 300);
        assert_eq!(cfg.frame_interval_ms, 16);
    }

    #[test]
    fn load_rejects_unparsable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "step_duration_secs = \"soon\"").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn get_and_set_by_key() {
        let mut cfg = AppConfig::default();
        assert_eq!(cfg.get("frame_interval_ms").as_deref(), Some("16"));
        assert!(cfg.get("missing").is_none());

        cfg.set("step_duration_secs", "240").unwrap();
        assert_eq!(cfg.step_duration_secs, 240);
        assert!(cfg.set("step_duration_secs", "0").is_err());
        assert!(cfg.set("frame_interval_ms", "0").is_err());
        assert!(matches!(
            cfg.set("theme", "dark"),
            Err(ConfigError::UnknownKey(_))
        ));
    }
}
