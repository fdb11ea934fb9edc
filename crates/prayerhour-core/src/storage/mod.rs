mod config;
pub mod kv;
pub mod session;

pub use config::{parse_step_duration, AppConfig};
pub use kv::{KvBackend, MemoryKv, SqliteKv};
pub use session::{SessionPersistence, SessionSnapshot, SESSION_MAX_AGE_MS};

use std::path::PathBuf;

use crate::error::CoreError;

/// Returns the data directory, creating it if needed.
///
/// `PRAYERHOUR_HOME` wins if set. Otherwise `~/.config/prayerhour[-dev]/`
/// based on PRAYERHOUR_ENV (set PRAYERHOUR_ENV=dev for the development dir).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let dir = match std::env::var_os("PRAYERHOUR_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env =
                std::env::var("PRAYERHOUR_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("prayerhour-dev")
            } else {
                base_dir.join("prayerhour")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
