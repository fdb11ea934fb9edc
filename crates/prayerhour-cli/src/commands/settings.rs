use clap::Subcommand;
use prayerhour_core::{SessionPersistence, Settings, SettingsPatch};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the current settings as JSON
    Show,
    /// Set one setting (audio_enabled, primary_color, wake_lock_enabled)
    Set {
        key: String,
        value: String,
    },
    /// Restore default settings
    Reset,
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut persistence = SessionPersistence::open_default();

    match action {
        SettingsAction::Show => {
            let settings = persistence.load_settings();
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Set { key, value } => {
            let patch = SettingsPatch::from_key_value(&key, &value)?;
            let mut settings = persistence.load_settings();
            settings.apply(patch);
            persistence.save_settings(&settings);
            println!("ok");
        }
        SettingsAction::Reset => {
            persistence.save_settings(&Settings::default());
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
