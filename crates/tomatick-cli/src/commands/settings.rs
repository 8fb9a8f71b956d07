use clap::Subcommand;
use tomatick_core::audio::LoggingBackend;
use tomatick_core::{AmbientPlayer, AppConfig, TimerController};
use tracing::debug;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the persisted settings record as JSON
    Show,
    /// Apply edited settings (omitted fields keep their current value)
    Apply {
        /// Work duration in minutes
        #[arg(long)]
        pomodoro: Option<String>,
        /// Short break in minutes
        #[arg(long)]
        short: Option<String>,
        /// Long break in minutes
        #[arg(long)]
        long: Option<String>,
        /// Long break after every fourth work session
        #[arg(long, action = clap::ArgAction::Set)]
        sequence: Option<bool>,
        /// Background image identifier (see `tomatick assets`)
        #[arg(long)]
        background: Option<String>,
    },
    /// Forget the persisted settings
    Reset,
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let (config, mut store) = AppConfig::load_with_store()?;
    debug!(backend = ?config.storage.backend, "settings store opened");

    match action {
        SettingsAction::Show => {
            let record = store.load();
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        SettingsAction::Apply {
            pomodoro,
            short,
            long,
            sequence,
            background,
        } => {
            let mut controller =
                TimerController::load(store, AmbientPlayer::new(LoggingBackend::new()));
            let mut draft = controller.settings_draft();
            if let Some(v) = pomodoro {
                draft.pomodoro = v;
            }
            if let Some(v) = short {
                draft.short = v;
            }
            if let Some(v) = long {
                draft.long = v;
            }
            if let Some(v) = sequence {
                draft.sequence = v;
            }
            if let Some(v) = background {
                draft.background_image = v;
            }
            for event in controller.apply_settings(&draft) {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
        }
        SettingsAction::Reset => {
            store.clear()?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
