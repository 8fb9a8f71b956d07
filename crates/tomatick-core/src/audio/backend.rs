//! Device-free implementations of the audio seams.

use tracing::info;

use super::{AlarmCue, AudioBackend, PlaybackHandle};
use crate::assets::is_known_track;
use crate::error::AudioError;

/// Backend that only records playback in the log.
///
/// Refuses tracks outside the catalog, the same way a real backend fails on a
/// missing asset.
#[derive(Debug, Default)]
pub struct LoggingBackend;

impl LoggingBackend {
    pub fn new() -> Self {
        Self
    }
}

struct LoggedHandle {
    track: String,
}

impl PlaybackHandle for LoggedHandle {
    fn set_volume(&mut self, volume: f64) {
        info!(track = %self.track, volume, "ambient volume");
    }

    fn stop(&mut self) {
        info!(track = %self.track, "ambient loop stopped");
    }
}

impl AudioBackend for LoggingBackend {
    fn start_loop(
        &mut self,
        track: &str,
        volume: f64,
    ) -> Result<Box<dyn PlaybackHandle>, AudioError> {
        if !is_known_track(track) {
            return Err(AudioError::AssetNotFound(track.to_string()));
        }
        info!(track, volume, "ambient loop started");
        Ok(Box::new(LoggedHandle {
            track: track.to_string(),
        }))
    }
}

/// Alarm that makes no sound.
#[derive(Debug, Default)]
pub struct SilentAlarm;

impl AlarmCue for SilentAlarm {
    fn play(&mut self) -> Result<(), AudioError> {
        Ok(())
    }
}
