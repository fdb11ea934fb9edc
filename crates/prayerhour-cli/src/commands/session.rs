use clap::Subcommand;
use prayerhour_core::SessionPersistence;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Delete the saved session so the next run starts fresh
    Clear,
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut persistence = SessionPersistence::open_default();

    match action {
        SessionAction::Clear => {
            persistence.clear_session();
            println!("session cleared");
        }
    }
    Ok(())
}
