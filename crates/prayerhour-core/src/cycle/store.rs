//! Cycle state store.
//!
//! Holds the step position, remaining time and status. All actions are
//! synchronous and permissive: a request that does not apply to the current
//! status is ignored rather than reported.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Active -> (Paused <-> Active) -> Completed -> Idle
//! ```
//!
//! The store never advances on its own. `update_timer(0.0)` only records the
//! value; the orchestrator decides when to call `next_step()`.

use tracing::debug;

use super::state::{CycleState, CycleStatus, SettingsPatch};
use super::steps::LAST_STEP_INDEX;

/// Fields accepted from an external snapshot. Each one is validated on its own.
#[derive(Debug, Clone, Default)]
pub struct RestorePatch {
    pub current_step_index: Option<i64>,
    pub time_remaining_secs: Option<f64>,
    pub status: Option<CycleStatus>,
    pub settings: Option<SettingsPatch>,
}

#[derive(Debug, Clone, Default)]
pub struct CycleStore {
    state: CycleState,
}

impl CycleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose steps last `step_duration_secs` (0 is ignored).
    pub fn with_step_duration(step_duration_secs: u32) -> Self {
        let mut store = Self::new();
        store.set_step_duration(step_duration_secs);
        store
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &CycleState {
        &self.state
    }

    pub fn status(&self) -> CycleStatus {
        self.state.status
    }

    pub fn current_step_index(&self) -> usize {
        self.state.current_step_index
    }

    pub fn time_remaining_secs(&self) -> f64 {
        self.state.time_remaining_secs
    }

    pub fn step_duration_secs(&self) -> u32 {
        self.state.step_duration_secs
    }

    fn full_duration(&self) -> f64 {
        f64::from(self.state.step_duration_secs)
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Step 0, full duration, Active. Valid from any status.
    pub fn start_cycle(&mut self) {
        self.state.current_step_index = 0;
        self.state.time_remaining_secs = self.full_duration();
        self.transition(CycleStatus::Active);
    }

    pub fn pause_timer(&mut self) {
        if self.state.status == CycleStatus::Active {
            self.transition(CycleStatus::Paused);
        }
    }

    pub fn resume_timer(&mut self) {
        if self.state.status == CycleStatus::Paused {
            self.transition(CycleStatus::Active);
        }
    }

    /// Advance one step, or complete the cycle from the last step.
    pub fn next_step(&mut self) {
        if self.state.current_step_index < LAST_STEP_INDEX {
            self.state.current_step_index += 1;
            self.state.time_remaining_secs = self.full_duration();
            debug!(step = self.state.current_step_index, "advanced to next step");
            self.transition(CycleStatus::Active);
        } else {
            self.complete_cycle();
        }
    }

    fn complete_cycle(&mut self) {
        self.state.current_step_index = LAST_STEP_INDEX;
        self.state.time_remaining_secs = 0.0;
        self.transition(CycleStatus::Completed);
    }

    /// Record the countdown. Ignored while Idle or Completed: Idle always
    /// holds the full step duration and Completed always holds 0.
    pub fn update_timer(&mut self, remaining_secs: f64) {
        if matches!(self.state.status, CycleStatus::Idle | CycleStatus::Completed) {
            return;
        }
        self.state.time_remaining_secs = clamp_time(remaining_secs);
    }

    /// Back to the start line: step 0, full duration, Idle.
    pub fn restart_cycle(&mut self) {
        self.state.current_step_index = 0;
        self.state.time_remaining_secs = self.full_duration();
        self.transition(CycleStatus::Idle);
    }

    /// Same as [`restart_cycle`](Self::restart_cycle).
    pub fn reset(&mut self) {
        self.restart_cycle();
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        self.state.settings.apply(patch);
    }

    pub fn set_step_duration(&mut self, secs: u32) {
        if secs == 0 {
            return;
        }
        self.state.step_duration_secs = secs;
        if self.state.status == CycleStatus::Idle {
            self.state.time_remaining_secs = self.full_duration();
        }
    }

    /// Apply whatever subset of a snapshot is present, clamping each field.
    pub fn restore_session(&mut self, patch: RestorePatch) {
        if let Some(index) = patch.current_step_index {
            self.state.current_step_index = index.clamp(0, LAST_STEP_INDEX as i64) as usize;
        }
        if let Some(remaining) = patch.time_remaining_secs {
            self.state.time_remaining_secs = clamp_time(remaining);
        }
        if let Some(status) = patch.status {
            self.state.status = status;
        }
        if let Some(settings) = patch.settings {
            self.state.settings.apply(settings);
        }

        match self.state.status {
            CycleStatus::Completed => {
                self.state.current_step_index = LAST_STEP_INDEX;
                self.state.time_remaining_secs = 0.0;
            }
            CycleStatus::Idle => {
                self.state.current_step_index = 0;
                self.state.time_remaining_secs = self.full_duration();
            }
            _ => {}
        }
        debug!(
            step = self.state.current_step_index,
            remaining = self.state.time_remaining_secs,
            status = %self.state.status,
            "session restored"
        );
    }

    fn transition(&mut self, to: CycleStatus) {
        if self.state.status != to {
            debug!(from = %self.state.status, to = %to, "cycle status changed");
        }
        self.state.status = to;
    }
}

fn clamp_time(secs: f64) -> f64 {
    if secs.is_nan() {
        0.0
    } else {
        secs.max(0.0)
    }
}
