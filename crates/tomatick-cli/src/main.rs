use clap::{CommandFactory, Parser, Subcommand};
use tomatick_core::AppConfig;

mod commands;
mod logging;
mod terminal;

#[derive(Parser)]
#[command(name = "tomatick", version, about = "Tomatick Pomodoro timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive timer session (commands on stdin)
    Run(commands::run::RunArgs),
    /// Persisted timer settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Application configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// List background and ambient track identifiers
    Assets {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(&AppConfig::load_or_default().log_filter);

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Assets { json } => commands::assets::run(json),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "tomatick", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
