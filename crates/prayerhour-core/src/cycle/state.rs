//! Cycle state types.
//!
//! `CycleState` is only ever mutated through [`CycleStore`](super::CycleStore)
//! actions; everything here is plain data plus the settings whitelist.

use serde::{Deserialize, Serialize};

use super::steps::DEFAULT_STEP_DURATION_SECS;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleStatus {
    Idle,
    Active,
    Paused,
    /// Reserved. Labelled by hosts but never produced by any transition.
    Transitioning,
    Completed,
}

impl CycleStatus {
    /// Statuses worth snapshotting for recovery.
    pub fn is_recoverable(self) -> bool {
        matches!(
            self,
            CycleStatus::Active | CycleStatus::Paused | CycleStatus::Transitioning
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CycleStatus::Idle => "idle",
            CycleStatus::Active => "active",
            CycleStatus::Paused => "paused",
            CycleStatus::Transitioning => "transitioning",
            CycleStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(CycleStatus::Idle),
            "active" => Some(CycleStatus::Active),
            "paused" => Some(CycleStatus::Paused),
            "transitioning" => Some(CycleStatus::Transitioning),
            "completed" => Some(CycleStatus::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User preferences persisted alongside the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_true")]
    pub audio_enabled: bool,
    #[serde(default = "default_primary_color")]
    pub primary_color: String,
    #[serde(default = "default_true")]
    pub wake_lock_enabled: bool,
}

fn default_true() -> bool {
    true
}

pub fn default_primary_color() -> String {
    "#7c3aed".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio_enabled: true,
            primary_color: default_primary_color(),
            wake_lock_enabled: true,
        }
    }
}

/// `#RGB` or `#RRGGBB`.
pub fn is_valid_color(value: &str) -> bool {
    let Some(hex) = value.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

/// Partial settings update. Only these fields can be merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub audio_enabled: Option<bool>,
    pub primary_color: Option<String>,
    pub wake_lock_enabled: Option<bool>,
}

impl SettingsPatch {
    /// Build a single-field patch from a `key = value` pair.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] for keys outside the whitelist and
    /// [`ConfigError::InvalidValue`] when the value does not parse.
    pub fn from_key_value(key: &str, value: &str) -> Result<Self, ConfigError> {
        let parse_bool = |v: &str| {
            v.parse::<bool>().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected true or false, got '{v}'"),
            })
        };

        let mut patch = Self::default();
        match key {
            "audio_enabled" | "audioEnabled" => patch.audio_enabled = Some(parse_bool(value)?),
            "wake_lock_enabled" | "wakeLockEnabled" => {
                patch.wake_lock_enabled = Some(parse_bool(value)?)
            }
            "primary_color" | "primaryColor" => {
                if !is_valid_color(value) {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        message: format!("expected #RGB or #RRGGBB, got '{value}'"),
                    });
                }
                patch.primary_color = Some(value.to_string());
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(patch)
    }
}

impl Settings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.audio_enabled {
            self.audio_enabled = v;
        }
        if let Some(v) = patch.primary_color {
            self.primary_color = v;
        }
        if let Some(v) = patch.wake_lock_enabled {
            self.wake_lock_enabled = v;
        }
    }
}

impl From<Settings> for SettingsPatch {
    fn from(s: Settings) -> Self {
        Self {
            audio_enabled: Some(s.audio_enabled),
            primary_color: Some(s.primary_color),
            wake_lock_enabled: Some(s.wake_lock_enabled),
        }
    }
}

/// The full mutable cycle state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleState {
    pub current_step_index: usize,
    pub time_remaining_secs: f64,
    pub status: CycleStatus,
    pub step_duration_secs: u32,
    pub settings: Settings,
}

impl Default for CycleState {
    fn default() -> Self {
        Self {
            current_step_index: 0,
            time_remaining_secs: f64::from(DEFAULT_STEP_DURATION_SECS),
            status: CycleStatus::Idle,
            step_duration_secs: DEFAULT_STEP_DURATION_SECS,
            settings: Settings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for s in [
            CycleStatus::Idle,
            CycleStatus::Active,
            CycleStatus::Paused,
            CycleStatus::Transitioning,
            CycleStatus::Completed,
        ] {
            assert_eq!(CycleStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(CycleStatus::parse("running"), None);
    }

    #[test]
    fn only_in_progress_statuses_are_recoverable() {
        assert!(CycleStatus::Active.is_recoverable());
        assert!(CycleStatus::Paused.is_recoverable());
        assert!(CycleStatus::Transitioning.is_recoverable());
        assert!(!CycleStatus::Idle.is_recoverable());
        assert!(!CycleStatus::Completed.is_recoverable());
    }

    #[test]
    fn color_validation() {
        assert!(is_valid_color("#fff"));
        assert!(is_valid_color("#7C3AED"));
        assert!(!is_valid_color("7c3aed"));
        assert!(!is_valid_color("#7c3ae"));
        assert!(!is_valid_color("#zzzzzz"));
        assert!(!is_valid_color(""));
    }

    #[test]
    fn patch_from_key_value_rejects_unknown_keys() {
        assert!(matches!(
            SettingsPatch::from_key_value("theme", "dark"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            SettingsPatch::from_key_value("audio_enabled", "loud"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn apply_merges_only_present_fields() {
        let mut settings = Settings::default();
        let patch = SettingsPatch::from_key_value("primary_color", "#112233").unwrap();
        settings.apply(patch);
        assert_eq!(settings.primary_color, "#112233");
        assert!(settings.audio_enabled);
        assert!(settings.wake_lock_enabled);
    }
}
