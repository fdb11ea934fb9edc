use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "prayerhour", version, about = "Prayerhour CLI -- a guided 12-step prayer hour")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run (or recover) a prayer cycle in the foreground
    Run(commands::run::RunArgs),
    /// Print the saved session and progress as JSON
    Status,
    /// List the 12 steps of the cycle
    Steps,
    /// User settings (audio, colour, wake lock)
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Saved session management
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Host configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("prayerhour={level},prayerhour_core={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Status => commands::status::run(),
        Commands::Steps => commands::steps::run(),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Session { action } => commands::session::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "prayerhour", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
