//! Interactive session.
//!
//! Reads one command per line from stdin while the clock ticks. The display
//! goes to stdout as one line per second; events are printed as JSON lines.

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tomatick_core::audio::LoggingBackend;
use tomatick_core::{AmbientPlayer, AppConfig, ConfigStore, Event, SessionMode, TimerController};
use tracing::{debug, info};

use crate::terminal::{TerminalBell, TerminalView};

#[derive(Args)]
pub struct RunArgs {
    /// Start the clock immediately
    #[arg(long)]
    pub autostart: bool,
    /// Print events only, no display lines
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Pause,
    Reset,
    Mode(SessionMode),
    /// Click on a track in the list (toggles off when already playing).
    Ambient(String),
    AmbientToggle,
    AmbientOff,
    Volume(f64),
    Settings {
        pomodoro: String,
        short: String,
        long: String,
        sequence: bool,
        background: Option<String>,
    },
    Status,
    Help,
    Quit,
}

const HELP: &str = "\
commands:
  start | pause | reset
  mode <work|short-break|long-break>
  ambient <track> | ambient toggle | ambient off
  volume <0..1>
  settings <pomodoro> <short> <long> <sequence:true|false> [background]
  status | help | quit";

pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err("empty command".into());
    };
    let rest: Vec<&str> = words.collect();

    let command = match (head, rest.as_slice()) {
        ("start", []) => Command::Start,
        ("pause" | "stop", []) => Command::Pause,
        ("reset", []) => Command::Reset,
        ("mode", [mode]) => Command::Mode(mode.parse()?),
        ("ambient", ["toggle"]) => Command::AmbientToggle,
        ("ambient", ["off"]) => Command::AmbientOff,
        ("ambient", [track]) => Command::Ambient(track.to_string()),
        ("volume", [v]) => Command::Volume(
            v.parse()
                .map_err(|_| format!("volume must be a number: {v}"))?,
        ),
        ("settings", [p, s, l, seq, bg @ ..]) if bg.len() <= 1 => Command::Settings {
            pomodoro: p.to_string(),
            short: s.to_string(),
            long: l.to_string(),
            sequence: seq
                .parse()
                .map_err(|_| format!("sequence must be true or false: {seq}"))?,
            background: bg.first().map(|b| b.to_string()),
        },
        ("status", []) => Command::Status,
        ("help", []) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        _ => return Err(format!("unrecognized command: {}", line.trim())),
    };
    Ok(command)
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (config, store) = AppConfig::load_with_store()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(session(config, store, args))
}

async fn session(
    config: AppConfig,
    store: ConfigStore,
    args: RunArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    info!(backend = ?config.storage.backend, "session started");
    let player = AmbientPlayer::new(LoggingBackend::new())
        .with_volume(config.ambient_volume())
        .with_default_track(&config.ambient.default_track);

    let mut controller = TimerController::load(store, player);
    if !args.quiet {
        controller = controller.with_view(TerminalView::new());
    }
    if config.alarm.enabled {
        controller = controller.with_alarm(TerminalBell);
    }

    if args.autostart {
        emit(controller.start())?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = controller.next_tick() => emit(event)?,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => dispatch(&mut controller, command)?,
                    Err(msg) => {
                        debug!(line = %line.trim(), "rejected input");
                        eprintln!("{msg}");
                    }
                }
            }
        }
    }

    controller.shutdown();
    info!(completed = controller.completed_count(), "session ended");
    Ok(())
}

fn dispatch(
    controller: &mut TimerController,
    command: Command,
) -> Result<(), Box<dyn std::error::Error>> {
    debug!(?command, "dispatching");
    match command {
        Command::Start => emit(controller.start())?,
        Command::Pause => emit(controller.pause())?,
        Command::Reset => emit(controller.reset())?,
        Command::Mode(mode) => emit(controller.switch_mode(mode))?,
        Command::Ambient(track) => emit(controller.select_ambient(&track))?,
        Command::AmbientToggle => emit(controller.toggle_ambient())?,
        Command::AmbientOff => emit(controller.stop_ambient())?,
        Command::Volume(v) => emit(controller.set_volume(v))?,
        Command::Settings {
            pomodoro,
            short,
            long,
            sequence,
            background,
        } => {
            let mut draft = controller.settings_draft();
            draft.pomodoro = pomodoro;
            draft.short = short;
            draft.long = long;
            draft.sequence = sequence;
            if let Some(bg) = background {
                draft.background_image = bg;
            }
            for event in controller.apply_settings(&draft) {
                emit(Some(event))?;
            }
        }
        Command::Status => emit(Some(controller.snapshot()))?,
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}

fn emit(event: Option<Event>) -> Result<(), serde_json::Error> {
    if let Some(event) = event {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_timer_commands() {
        assert_eq!(parse_command("start"), Ok(Command::Start));
        assert_eq!(parse_command("  stop "), Ok(Command::Pause));
        assert_eq!(
            parse_command("mode long-break"),
            Ok(Command::Mode(SessionMode::LongBreak))
        );
        assert!(parse_command("mode nap").is_err());
    }

    #[test]
    fn parses_ambient_commands() {
        assert_eq!(
            parse_command("ambient rain"),
            Ok(Command::Ambient("rain".into()))
        );
        assert_eq!(parse_command("ambient toggle"), Ok(Command::AmbientToggle));
        assert_eq!(parse_command("ambient off"), Ok(Command::AmbientOff));
        assert_eq!(parse_command("volume 0.4"), Ok(Command::Volume(0.4)));
        assert!(parse_command("volume loud").is_err());
    }

    #[test]
    fn parses_settings_with_optional_background() {
        assert_eq!(
            parse_command("settings 30 5x 0 true photo2.webp"),
            Ok(Command::Settings {
                pomodoro: "30".into(),
                short: "5x".into(),
                long: "0".into(),
                sequence: true,
                background: Some("photo2.webp".into()),
            })
        );
        assert!(matches!(
            parse_command("settings 30 5 10 false"),
            Ok(Command::Settings { background: None, .. })
        ));
        assert!(parse_command("settings 30 5 10 maybe").is_err());
        assert!(parse_command("settings 30 5").is_err());
    }

    #[test]
    fn rejects_unknown_and_extra_words() {
        assert!(parse_command("start now").is_err());
        assert!(parse_command("dance").is_err());
        assert!(parse_command("").is_err());
    }
}
