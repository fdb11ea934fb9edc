use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cycle::CycleStatus;

/// Every user-visible change made by the controller produces an Event.
/// Hosts drain them after each call to render or log transitions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    CycleStarted {
        step_duration_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: f64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: f64,
        at: DateTime<Utc>,
    },
    /// The countdown for a step ran out and the cycle moved on.
    StepAdvanced {
        step_index: usize,
        name_key: &'static str,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    StepSkipped {
        from_step: usize,
        to_step: usize,
        at: DateTime<Utc>,
    },
    CycleCompleted {
        at: DateTime<Utc>,
    },
    CycleRestarted {
        at: DateTime<Utc>,
    },
    SessionRecovered {
        step_index: usize,
        remaining_secs: f64,
        status: CycleStatus,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: CycleStatus,
        step_index: usize,
        name_key: &'static str,
        label: &'static str,
        remaining_secs: f64,
        step_duration_secs: u32,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
}
