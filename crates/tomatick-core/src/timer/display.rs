use serde::{Deserialize, Serialize};

use super::mode::SessionMode;

/// What the presentation layer needs to redraw the timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayFrame {
    /// `MM:SS`, minutes widen past two digits instead of clamping.
    pub formatted: String,
    /// Remaining share of the current session, 0.0 ..= 1.0.
    pub progress: f64,
    pub mode: SessionMode,
    pub running: bool,
}

impl DisplayFrame {
    pub fn new(remaining_secs: u64, total_secs: u64, mode: SessionMode, running: bool) -> Self {
        Self {
            formatted: format_mmss(remaining_secs),
            progress: progress_fraction(remaining_secs, total_secs),
            mode,
            running,
        }
    }
}

/// Rendering collaborator. Receives a frame after every state change.
pub trait TimerView {
    fn render(&mut self, frame: &DisplayFrame);
}

/// Zero-padded `MM:SS`.
pub fn format_mmss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// `remaining / total`, clamped to `[0, 1]`. A zero total reads as empty.
pub fn progress_fraction(remaining_secs: u64, total_secs: u64) -> f64 {
    if total_secs == 0 {
        return 0.0;
    }
    (remaining_secs as f64 / total_secs as f64).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_minutes_and_seconds() {
        assert_eq!(format_mmss(0), "00:00");
        assert_eq!(format_mmss(65), "01:05");
        assert_eq!(format_mmss(25 * 60), "25:00");
    }

    #[test]
    fn minutes_widen_past_99() {
        assert_eq!(format_mmss(100 * 60), "100:00");
        assert_eq!(format_mmss(125 * 60 + 9), "125:09");
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(progress_fraction(30, 60), 0.5);
        assert_eq!(progress_fraction(120, 60), 1.0);
        assert_eq!(progress_fraction(0, 60), 0.0);
        assert_eq!(progress_fraction(10, 0), 0.0);
    }
}
