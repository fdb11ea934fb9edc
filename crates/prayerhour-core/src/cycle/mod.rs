mod progress;
mod state;
mod steps;
mod store;

pub use progress::{current_step, progress_percentage, step_fraction, step_progress, StepProgress};
pub use state::{
    default_primary_color, is_valid_color, CycleState, CycleStatus, Settings, SettingsPatch,
};
pub use steps::{
    step_at, PrayerStep, DEFAULT_STEP_DURATION_SECS, LAST_STEP_INDEX,
    PRAYER_STEPS, STEP_COUNT,
};
pub use store::{CycleStore, RestorePatch};
