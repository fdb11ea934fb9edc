use chrono::Utc;
use prayerhour_core::cycle::{current_step, progress_percentage, step_progress, RestorePatch};
use prayerhour_core::{AppConfig, CycleStore, SessionPersistence};
use serde_json::json;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_or_default();
    let mut persistence = SessionPersistence::open_default();
    let mut store = CycleStore::with_step_duration(config.step_duration_secs);
    store.update_settings(persistence.load_settings().into());

    let session = persistence.load_session();
    if let Some(snapshot) = &session {
        store.restore_session(RestorePatch::from(snapshot));
    }

    let state = store.state();
    let view = json!({
        "session": session.as_ref().map(|s| json!({
            "currentStep": s.current_step_index,
            "timeRemaining": s.time_remaining_secs,
            "status": s.status,
            "capturedAt": s.captured_at,
            "ageSecs": s.age_ms(Utc::now()) / 1000,
        })),
        "status": state.status,
        "step": current_step(state),
        "stepProgress": step_progress(state),
        "progressPct": progress_percentage(state),
        "settings": state.settings,
    });
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}
