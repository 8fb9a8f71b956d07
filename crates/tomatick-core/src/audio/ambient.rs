//! Ambient audio controller.
//!
//! ```text
//! idle --play(t)--> playing(t) --play(u)--> playing(u)
//!                   playing(t) --stop()---> idle
//! ```
//!
//! At most one loop is alive at a time: starting a track always stops the
//! current one first. The selected entry in a track list is the playing
//! track, so zero or one entries are ever selected.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{AudioBackend, PlaybackHandle};
use crate::assets::DEFAULT_AMBIENT_TRACK;
use crate::events::Event;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum AmbientState {
    Idle,
    Playing { track: String, volume: f64 },
}

struct Playing {
    track: String,
    handle: Box<dyn PlaybackHandle>,
}

pub struct AmbientPlayer {
    backend: Box<dyn AudioBackend>,
    volume: f64,
    current: Option<Playing>,
    /// Last track that actually started; the on/off control resumes it.
    last_track: Option<String>,
    default_track: String,
}

impl AmbientPlayer {
    pub fn new(backend: impl AudioBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            volume: 0.5,
            current: None,
            last_track: None,
            default_track: DEFAULT_AMBIENT_TRACK.to_string(),
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        if volume.is_finite() {
            self.volume = volume.clamp(0.0, 1.0);
        }
        self
    }

    /// Track the on/off control starts when nothing was played before.
    pub fn with_default_track(mut self, track: &str) -> Self {
        if !track.trim().is_empty() {
            self.default_track = track.trim().to_string();
        }
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> AmbientState {
        match &self.current {
            Some(playing) => AmbientState::Playing {
                track: playing.track.clone(),
                volume: self.volume,
            },
            None => AmbientState::Idle,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.current.is_some()
    }

    /// The selected (playing) track, if any.
    pub fn selected(&self) -> Option<&str> {
        self.current.as_ref().map(|p| p.track.as_str())
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Loop `track`, replacing whatever is playing. A blank track is ignored.
    ///
    /// If the backend cannot start the track the player ends up idle.
    pub fn play(&mut self, track: &str) -> Option<Event> {
        let track = track.trim();
        if track.is_empty() {
            warn!("ambient play requested without a track; ignoring");
            return None;
        }
        let replaced = self.release();
        match self.backend.start_loop(track, self.volume) {
            Ok(handle) => {
                debug!(track, volume = self.volume, "ambient playing");
                self.current = Some(Playing {
                    track: track.to_string(),
                    handle,
                });
                self.last_track = Some(track.to_string());
                Some(Event::AmbientStarted {
                    track: track.to_string(),
                    volume: self.volume,
                    replaced,
                    at: Utc::now(),
                })
            }
            Err(e) => {
                warn!(track, error = %e, "ambient playback failed");
                replaced.map(|track| Event::AmbientStopped {
                    track,
                    at: Utc::now(),
                })
            }
        }
    }

    /// Halt playback. Returns `None` when already idle.
    pub fn stop(&mut self) -> Option<Event> {
        self.release().map(|track| Event::AmbientStopped {
            track,
            at: Utc::now(),
        })
    }

    /// Track-list click: the playing track toggles off, any other track
    /// switches playback to it.
    pub fn select(&mut self, track: &str) -> Option<Event> {
        if self.selected() == Some(track.trim()) {
            self.stop()
        } else {
            self.play(track)
        }
    }

    /// On/off control. Resumes the last track, or the default track when
    /// nothing has played yet.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.is_playing() {
            return self.stop();
        }
        let track = self
            .last_track
            .clone()
            .unwrap_or_else(|| self.default_track.clone());
        self.play(&track)
    }

    /// Change the volume, live if a track is playing. Non-finite values are
    /// ignored; others are clamped to `[0, 1]`.
    pub fn set_volume(&mut self, volume: f64) -> Option<Event> {
        if !volume.is_finite() {
            warn!(volume, "ignoring non-finite ambient volume");
            return None;
        }
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(playing) = self.current.as_mut() {
            playing.handle.set_volume(self.volume);
        }
        Some(Event::VolumeChanged {
            volume: self.volume,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Stop and drop the live handle, returning its track.
    fn release(&mut self) -> Option<String> {
        let mut playing = self.current.take()?;
        playing.handle.stop();
        debug!(track = %playing.track, "ambient released");
        Some(playing.track)
    }
}

impl Drop for AmbientPlayer {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::error::AudioError;

    #[derive(Default)]
    struct Log {
        live: Vec<String>,
        volumes: Vec<(String, f64)>,
        started: Vec<String>,
    }

    #[derive(Clone, Default)]
    struct RecordingBackend {
        log: Rc<RefCell<Log>>,
    }

    struct RecordingHandle {
        track: String,
        log: Rc<RefCell<Log>>,
    }

    impl PlaybackHandle for RecordingHandle {
        fn set_volume(&mut self, volume: f64) {
            self.log.borrow_mut().volumes.push((self.track.clone(), volume));
        }

        fn stop(&mut self) {
            self.log.borrow_mut().live.retain(|t| t != &self.track);
        }
    }

    impl AudioBackend for RecordingBackend {
        fn start_loop(
            &mut self,
            track: &str,
            volume: f64,
        ) -> Result<Box<dyn PlaybackHandle>, AudioError> {
            if track == "missing" {
                return Err(AudioError::AssetNotFound(track.into()));
            }
            let mut log = self.log.borrow_mut();
            log.live.push(track.to_string());
            log.started.push(track.to_string());
            log.volumes.push((track.to_string(), volume));
            Ok(Box::new(RecordingHandle {
                track: track.to_string(),
                log: Rc::clone(&self.log),
            }))
        }
    }

    fn player() -> (AmbientPlayer, Rc<RefCell<Log>>) {
        let backend = RecordingBackend::default();
        let log = Rc::clone(&backend.log);
        (AmbientPlayer::new(backend), log)
    }

    #[test]
    fn switching_tracks_keeps_one_live_handle() {
        let (mut player, log) = player();
        player.play("rain");
        let event = player.play("forest");
        assert_eq!(log.borrow().live, vec!["forest".to_string()]);
        assert_eq!(player.selected(), Some("forest"));
        match event {
            Some(Event::AmbientStarted { track, replaced, .. }) => {
                assert_eq!(track, "forest");
                assert_eq!(replaced.as_deref(), Some("rain"));
            }
            other => panic!("expected AmbientStarted, got {other:?}"),
        }
    }

    #[test]
    fn replaying_same_track_restarts_it() {
        let (mut player, log) = player();
        player.play("rain");
        player.play("rain");
        assert_eq!(log.borrow().live, vec!["rain".to_string()]);
        assert_eq!(log.borrow().started.len(), 2);
    }

    #[test]
    fn selecting_playing_track_turns_it_off() {
        let (mut player, log) = player();
        player.select("waves");
        assert!(matches!(player.select("waves"), Some(Event::AmbientStopped { .. })));
        assert_eq!(player.state(), AmbientState::Idle);
        assert!(log.borrow().live.is_empty());
        assert_eq!(player.selected(), None);
    }

    #[test]
    fn blank_track_is_ignored() {
        let (mut player, log) = player();
        assert!(player.play("  ").is_none());
        assert!(log.borrow().started.is_empty());
    }

    #[test]
    fn stop_is_idempotent() {
        let (mut player, _log) = player();
        assert!(player.stop().is_none());
        player.play("cafe");
        assert!(player.stop().is_some());
        assert!(player.stop().is_none());
    }

    #[test]
    fn failed_playback_leaves_idle() {
        let (mut player, log) = player();
        player.play("rain");
        let event = player.play("missing");
        assert!(matches!(event, Some(Event::AmbientStopped { .. })));
        assert_eq!(player.state(), AmbientState::Idle);
        assert!(log.borrow().live.is_empty());
    }

    #[test]
    fn volume_applies_live_and_to_later_tracks() {
        let (mut player, log) = player();
        player.play("rain");
        player.set_volume(0.2);
        player.play("forest");
        let volumes = log.borrow().volumes.clone();
        assert!(volumes.contains(&("rain".to_string(), 0.2)));
        assert_eq!(volumes.last(), Some(&("forest".to_string(), 0.2)));
        assert_eq!(
            player.state(),
            AmbientState::Playing {
                track: "forest".into(),
                volume: 0.2
            }
        );
    }

    #[test]
    fn volume_is_clamped_and_nan_ignored() {
        let (mut player, _log) = player();
        player.set_volume(4.0);
        assert_eq!(player.volume(), 1.0);
        assert!(player.set_volume(f64::NAN).is_none());
        assert_eq!(player.volume(), 1.0);
    }

    #[test]
    fn toggle_uses_default_then_last_track() {
        let (mut player, _log) = player();
        player.toggle();
        assert_eq!(player.selected(), Some("rain"));
        player.select("fireplace");
        player.toggle();
        assert_eq!(player.selected(), None);
        player.toggle();
        assert_eq!(player.selected(), Some("fireplace"));
    }

    #[test]
    fn drop_releases_handle() {
        let (mut player, log) = player();
        player.play("rain");
        drop(player);
        assert!(log.borrow().live.is_empty());
    }
}
