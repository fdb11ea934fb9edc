//! Derived views over a `CycleState`. Pure functions, recomputed on every call.

use serde::Serialize;

use super::state::{CycleState, CycleStatus};
use super::steps::{step_at, PrayerStep, LAST_STEP_INDEX, STEP_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepProgress {
    /// 1-based position of the current step.
    pub current: usize,
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

/// Largest value strictly below 100.
fn just_below_hundred() -> f64 {
    f64::from_bits(100.0_f64.to_bits() - 1)
}

/// 0.0 .. 1.0 progress within the current step.
pub fn step_fraction(state: &CycleState) -> f64 {
    let total = f64::from(state.step_duration_secs);
    if total <= 0.0 {
        return 0.0;
    }
    ((total - state.time_remaining_secs) / total).clamp(0.0, 1.0)
}

/// 0.0 .. 100.0 progress across the whole cycle.
///
/// Exactly 100 only when the cycle is Completed.
pub fn progress_percentage(state: &CycleState) -> f64 {
    if state.status == CycleStatus::Completed {
        return 100.0;
    }
    let completed = state.current_step_index.min(LAST_STEP_INDEX) as f64;
    let pct = (completed + step_fraction(state)) / STEP_COUNT as f64 * 100.0;
    pct.min(just_below_hundred())
}

pub fn step_progress(state: &CycleState) -> StepProgress {
    let index = state.current_step_index.min(LAST_STEP_INDEX);
    StepProgress {
        current: index + 1,
        total: STEP_COUNT,
        completed: index,
        remaining: LAST_STEP_INDEX - index,
    }
}

pub fn current_step(state: &CycleState) -> &'static PrayerStep {
    step_at(state.current_step_index)
}
