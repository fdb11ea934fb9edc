//! Best-effort persistence of the recoverable session and user settings.
//!
//! Nothing in here returns an error. Backend faults are logged and the
//! caller sees "no data"; corrupt or stale records are deleted on read so
//! they cannot resurface. If the backend rejects the probe write at
//! construction, everything runs against an in-memory map instead.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::kv::{KvBackend, MemoryKv, SqliteKv};
use crate::cycle::{
    default_primary_color, is_valid_color, CycleState, CycleStatus, RestorePatch, Settings,
    SettingsPatch, LAST_STEP_INDEX,
};

pub const SESSION_KEY: &str = "prayerhour.session";
pub const SETTINGS_KEY: &str = "prayerhour.settings";
pub const SETTINGS_BACKUP_KEY: &str = "prayerhour.settings.backup";
const PROBE_KEY: &str = "prayerhour.probe";

/// Snapshots older than this are discarded.
pub const SESSION_MAX_AGE_MS: i64 = 2 * 60 * 60 * 1000;

/// Persisted copy of an in-progress cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub current_step_index: usize,
    pub time_remaining_secs: f64,
    pub status: CycleStatus,
    pub captured_at: DateTime<Utc>,
}

impl SessionSnapshot {
    fn to_record(&self) -> Value {
        json!({
            "currentStep": self.current_step_index,
            "timeRemaining": self.time_remaining_secs,
            "status": self.status.as_str(),
            "timestamp": self.captured_at.timestamp_millis(),
        })
    }

    /// Validate a raw record. The error string says why it was rejected.
    fn from_record(raw: &str) -> Result<Self, String> {
        let value: Value = serde_json::from_str(raw).map_err(|e| format!("corrupt JSON: {e}"))?;
        let obj = value.as_object().ok_or("record is not an object")?;

        let current_step_index = obj
            .get("currentStep")
            .and_then(Value::as_i64)
            .filter(|i| (0..=LAST_STEP_INDEX as i64).contains(i))
            .ok_or("currentStep missing or out of range")? as usize;

        let time_remaining_secs = obj
            .get("timeRemaining")
            .and_then(Value::as_f64)
            .filter(|t| t.is_finite() && *t >= 0.0)
            .ok_or("timeRemaining missing or negative")?;

        let status = obj
            .get("status")
            .and_then(Value::as_str)
            .and_then(CycleStatus::parse)
            .filter(|s| s.is_recoverable())
            .ok_or("status missing or not recoverable")?;

        let captured_at = obj
            .get("timestamp")
            .and_then(Value::as_i64)
            .filter(|ms| *ms > 0)
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .ok_or("timestamp missing or malformed")?;

        Ok(Self {
            current_step_index,
            time_remaining_secs,
            status,
            captured_at,
        })
    }

    pub fn age_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.captured_at).num_milliseconds()
    }
}

impl From<&SessionSnapshot> for RestorePatch {
    fn from(snapshot: &SessionSnapshot) -> Self {
        RestorePatch {
            current_step_index: Some(snapshot.current_step_index as i64),
            time_remaining_secs: Some(snapshot.time_remaining_secs),
            status: Some(snapshot.status),
            settings: None,
        }
    }
}

/// Session and settings persistence over a [`KvBackend`].
pub struct SessionPersistence {
    backend: Box<dyn KvBackend>,
    durable: bool,
}

impl SessionPersistence {
    /// Wrap `backend`, falling back to memory if a probe write fails.
    pub fn new(mut backend: Box<dyn KvBackend>) -> Self {
        let probe = backend
            .set(PROBE_KEY, "1")
            .and_then(|_| backend.remove(PROBE_KEY));
        match probe {
            Ok(()) => Self {
                backend,
                durable: true,
            },
            Err(e) => {
                warn!("storage unavailable, keeping session in memory: {e}");
                Self::in_memory()
            }
        }
    }

    /// Process-lifetime storage only.
    pub fn in_memory() -> Self {
        Self {
            backend: Box::new(MemoryKv::new()),
            durable: false,
        }
    }

    /// SQLite store in the data directory, or memory if it cannot be opened.
    pub fn open_default() -> Self {
        match SqliteKv::open_default() {
            Ok(kv) => Self::new(Box::new(kv)),
            Err(e) => {
                warn!("storage unavailable, keeping session in memory: {e}");
                Self::in_memory()
            }
        }
    }

    /// SQLite store at `path`, or memory if it cannot be opened.
    pub fn open(path: &std::path::Path) -> Self {
        match SqliteKv::open(path) {
            Ok(kv) => Self::new(Box::new(kv)),
            Err(e) => {
                warn!("storage unavailable, keeping session in memory: {e}");
                Self::in_memory()
            }
        }
    }

    /// Whether records outlive the process.
    pub fn is_durable(&self) -> bool {
        self.durable
    }

    // ── Session ──────────────────────────────────────────────────────

    pub fn save_session(&mut self, state: &CycleState) {
        self.save_session_at(state, Utc::now());
    }

    /// Snapshot `state` if it is in progress. Idle/Completed are skipped.
    pub fn save_session_at(&mut self, state: &CycleState, now: DateTime<Utc>) {
        if !state.status.is_recoverable() {
            return;
        }
        let snapshot = SessionSnapshot {
            current_step_index: state.current_step_index,
            time_remaining_secs: state.time_remaining_secs,
            status: state.status,
            captured_at: now,
        };
        self.write(SESSION_KEY, &snapshot.to_record());
        debug!(
            step = snapshot.current_step_index,
            remaining = snapshot.time_remaining_secs,
            "session saved"
        );
    }

    pub fn load_session(&mut self) -> Option<SessionSnapshot> {
        self.load_session_at(Utc::now())
    }

    /// Read the snapshot, deleting it if invalid or stale.
    pub fn load_session_at(&mut self, now: DateTime<Utc>) -> Option<SessionSnapshot> {
        let raw = self.read(SESSION_KEY)?;
        let snapshot = match SessionSnapshot::from_record(&raw) {
            Ok(snapshot) => snapshot,
            Err(reason) => {
                warn!("discarding saved session: {reason}");
                self.clear_session();
                return None;
            }
        };
        if snapshot.age_ms(now) > SESSION_MAX_AGE_MS {
            debug!(age_ms = snapshot.age_ms(now), "discarding stale session");
            self.clear_session();
            return None;
        }
        Some(snapshot)
    }

    pub fn clear_session(&mut self) {
        if let Err(e) = self.backend.remove(SESSION_KEY) {
            warn!("failed to clear session: {e}");
        }
    }

    // ── Settings ─────────────────────────────────────────────────────

    /// Write settings and their backup copy.
    pub fn save_settings(&mut self, settings: &Settings) {
        let record = json!({
            "audioEnabled": settings.audio_enabled,
            "primaryColor": settings.primary_color,
            "wakeLockEnabled": settings.wake_lock_enabled,
        });
        self.write(SETTINGS_KEY, &record);
        self.write(SETTINGS_BACKUP_KEY, &record);
    }

    /// Each field comes from the primary record if valid, else the backup,
    /// else the default.
    pub fn load_settings(&self) -> Settings {
        let primary = self.read_object(SETTINGS_KEY);
        let backup = self.read_object(SETTINGS_BACKUP_KEY);
        let layers = [primary.as_ref(), backup.as_ref()];

        let pick_bool = |field: &str| {
            layers
                .iter()
                .flatten()
                .find_map(|obj| obj.get(field).and_then(Value::as_bool))
        };
        let primary_color = layers
            .iter()
            .flatten()
            .find_map(|obj| {
                obj.get("primaryColor")
                    .and_then(Value::as_str)
                    .filter(|c| is_valid_color(c))
                    .map(str::to_string)
            })
            .unwrap_or_else(default_primary_color);

        let mut settings = Settings::default();
        settings.apply(SettingsPatch {
            audio_enabled: pick_bool("audioEnabled"),
            primary_color: Some(primary_color),
            wake_lock_enabled: pick_bool("wakeLockEnabled"),
        });
        settings
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(v) => v,
            Err(e) => {
                warn!(key, "storage read failed: {e}");
                None
            }
        }
    }

    fn read_object(&self, key: &str) -> Option<Map<String, Value>> {
        let raw = self.read(key)?;
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(obj)) => Some(obj),
            Ok(_) => {
                warn!(key, "record is not an object");
                None
            }
            Err(e) => {
                warn!(key, "corrupt record: {e}");
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: &Value) {
        if let Err(e) = self.backend.set(key, &value.to_string()) {
            warn!(key, "storage write failed: {e}");
        }
    }
}
