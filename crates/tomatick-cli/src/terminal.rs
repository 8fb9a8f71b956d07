//! Terminal renderings of the core's presentation seams.

use std::io::Write;

use tomatick_core::timer::{DisplayFrame, TimerView};
use tomatick_core::{AlarmCue, AudioError};

const BAR_WIDTH: usize = 20;

/// Prints one line per frame whose text differs from the previous one.
#[derive(Default)]
pub struct TerminalView {
    last: Option<String>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self { last: None }
    }
}

impl TimerView for TerminalView {
    fn render(&mut self, frame: &DisplayFrame) {
        let line = render_line(frame);
        if self.last.as_deref() == Some(line.as_str()) {
            return;
        }
        println!("{line}");
        self.last = Some(line);
    }
}

pub fn render_line(frame: &DisplayFrame) -> String {
    let filled = (frame.progress * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "{:<11} {} [{}{}] {}",
        frame.mode.as_str(),
        frame.formatted,
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        if frame.running { "running" } else { "stopped" },
    )
}

/// Rings the terminal bell on stderr.
pub struct TerminalBell;

impl AlarmCue for TerminalBell {
    fn play(&mut self) -> Result<(), AudioError> {
        let mut stderr = std::io::stderr();
        stderr
            .write_all(b"\x07")
            .and_then(|_| stderr.flush())
            .map_err(|e| AudioError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tomatick_core::SessionMode;

    #[test]
    fn line_shows_mode_time_and_bar() {
        let frame = DisplayFrame::new(750, 1500, SessionMode::Work, true);
        assert_eq!(
            render_line(&frame),
            "work        12:30 [##########----------] running"
        );
    }

    #[test]
    fn empty_bar_at_zero() {
        let frame = DisplayFrame::new(0, 300, SessionMode::ShortBreak, false);
        assert!(render_line(&frame).contains("[--------------------] stopped"));
    }
}
