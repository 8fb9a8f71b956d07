//! Audio seams.
//!
//! The core never touches an output device. Ambient loops go through an
//! [`AudioBackend`], the completion alarm through an [`AlarmCue`]; both are
//! supplied by the front end.

mod ambient;
mod backend;

pub use ambient::{AmbientPlayer, AmbientState};
pub use backend::{LoggingBackend, SilentAlarm};

use crate::error::AudioError;

/// Starts looping tracks.
pub trait AudioBackend {
    /// Begin looping `track` indefinitely at `volume` (0.0 ..= 1.0).
    fn start_loop(&mut self, track: &str, volume: f64)
        -> Result<Box<dyn PlaybackHandle>, AudioError>;
}

/// A live looping track. Dropping the handle without `stop` is allowed; the
/// player always calls `stop` first.
pub trait PlaybackHandle {
    fn set_volume(&mut self, volume: f64);

    fn stop(&mut self);
}

/// One-shot completion sound.
pub trait AlarmCue {
    fn play(&mut self) -> Result<(), AudioError>;
}
