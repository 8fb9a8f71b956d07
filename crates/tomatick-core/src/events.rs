use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Durations, SessionMode};

/// Every state change in the system produces an Event.
/// The front end prints or forwards them; the display is driven separately
/// through [`crate::timer::TimerView`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        mode: SessionMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        mode: SessionMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// User picked a mode directly.
    ModeSwitched {
        from: SessionMode,
        to: SessionMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// A countdown reached zero and the next session began.
    SessionCompleted {
        from: SessionMode,
        to: SessionMode,
        completed_count: u32,
        at: DateTime<Utc>,
    },
    SettingsApplied {
        durations: Durations,
        background_image: String,
        persisted: bool,
        at: DateTime<Utc>,
    },
    /// Background swap; the front end fades out, swaps, then fades in.
    BackgroundChanged {
        from: String,
        to: String,
        fade_out_ms: u64,
        fade_in_ms: u64,
        at: DateTime<Utc>,
    },
    AmbientStarted {
        track: String,
        volume: f64,
        /// Track that was stopped to make room, if any.
        replaced: Option<String>,
        at: DateTime<Utc>,
    },
    AmbientStopped {
        track: String,
        at: DateTime<Utc>,
    },
    VolumeChanged {
        volume: f64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: SessionMode,
        remaining_secs: u64,
        total_secs: u64,
        formatted: String,
        progress: f64,
        running: bool,
        completed_count: u32,
        durations: Durations,
        background_image: String,
        ambient_track: Option<String>,
        volume: f64,
        at: DateTime<Utc>,
    },
}
