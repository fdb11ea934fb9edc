use prayerhour_core::{AppConfig, PRAYER_STEPS};
use serde_json::json;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_or_default();
    let steps: Vec<_> = PRAYER_STEPS
        .iter()
        .map(|s| {
            json!({
                "id": s.id,
                "nameKey": s.name_key,
                "descriptionKey": s.description_key,
                "label": s.label,
                "durationSecs": config.step_duration_secs,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&steps)?);
    Ok(())
}
