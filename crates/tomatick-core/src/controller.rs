//! Timer controller.
//!
//! Single owner of every piece of mutable state: the session machine, the
//! countdown clock, the ambient player, the settings store and the current
//! background. All mutation happens inside `&mut self` methods, so a front
//! end drives it from one event loop without locks.
//!
//! ## Usage
//!
//! ```ignore
//! let mut controller = TimerController::load(ConfigStore::new(store), player);
//! controller.start();
//! loop {
//!     tokio::select! {
//!         event = controller.next_tick() => { /* Some(SessionCompleted) */ }
//!         line = input.next_line() => { /* user commands */ }
//!     }
//! }
//! ```

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::audio::{AlarmCue, AmbientPlayer};
use crate::events::Event;
use crate::storage::ConfigStore;
use crate::timer::{
    CountdownClock, DisplayFrame, Durations, SessionMachine, SessionMode, TickOutcome, TimerView,
};
use crate::transaction::{SettingsDraft, BACKGROUND_FADE_IN_MS, BACKGROUND_FADE_OUT_MS};

pub struct TimerController {
    session: SessionMachine,
    clock: CountdownClock,
    ambient: AmbientPlayer,
    store: ConfigStore,
    background_image: String,
    view: Option<Box<dyn TimerView>>,
    alarm: Option<Box<dyn AlarmCue>>,
}

impl TimerController {
    /// Build a controller from the persisted record (or its defaults).
    pub fn load(store: ConfigStore, ambient: AmbientPlayer) -> Self {
        let record = store.load();
        let durations = record.durations();
        let background_image = record.background_image().to_string();
        info!(
            pomodoro = durations.pomodoro,
            short = durations.short,
            long = durations.long,
            sequence = durations.sequence,
            background = %background_image,
            "settings loaded"
        );
        Self::new(durations, background_image, store, ambient)
    }

    /// Build a controller from explicit settings, ignoring whatever the
    /// store holds until the next `apply_settings`.
    pub fn new(
        durations: Durations,
        background_image: impl Into<String>,
        store: ConfigStore,
        ambient: AmbientPlayer,
    ) -> Self {
        Self {
            session: SessionMachine::new(durations),
            clock: CountdownClock::new(),
            ambient,
            store,
            background_image: background_image.into(),
            view: None,
            alarm: None,
        }
    }

    /// Attach the rendering collaborator and draw the initial frame.
    pub fn with_view(mut self, view: impl TimerView + 'static) -> Self {
        self.view = Some(Box::new(view));
        self.render();
        self
    }

    pub fn with_alarm(mut self, alarm: impl AlarmCue + 'static) -> Self {
        self.alarm = Some(Box::new(alarm));
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> SessionMode {
        self.session.mode()
    }

    pub fn remaining_secs(&self) -> u64 {
        self.session.remaining_secs()
    }

    pub fn completed_count(&self) -> u32 {
        self.session.completed_count()
    }

    pub fn durations(&self) -> &Durations {
        self.session.durations()
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn background_image(&self) -> &str {
        &self.background_image
    }

    pub fn ambient(&self) -> &AmbientPlayer {
        &self.ambient
    }

    pub fn clock(&self) -> &CountdownClock {
        &self.clock
    }

    pub fn frame(&self) -> DisplayFrame {
        DisplayFrame::new(
            self.session.remaining_secs(),
            self.session.total_secs(),
            self.session.mode(),
            self.clock.is_running(),
        )
    }

    /// Draft pre-filled with the live settings.
    pub fn settings_draft(&self) -> SettingsDraft {
        SettingsDraft::from_current(self.session.durations(), &self.background_image)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let frame = self.frame();
        Event::StateSnapshot {
            mode: frame.mode,
            remaining_secs: self.session.remaining_secs(),
            total_secs: self.session.total_secs(),
            formatted: frame.formatted,
            progress: frame.progress,
            running: frame.running,
            completed_count: self.session.completed_count(),
            durations: *self.session.durations(),
            background_image: self.background_image.clone(),
            ambient_track: self.ambient.selected().map(str::to_string),
            volume: self.ambient.volume(),
            at: Utc::now(),
        }
    }

    // ── Timer commands ───────────────────────────────────────────────

    /// Start the clock. `None` if it was already running.
    pub fn start(&mut self) -> Option<Event> {
        if !self.clock.start() {
            return None;
        }
        self.render();
        Some(Event::TimerStarted {
            mode: self.session.mode(),
            remaining_secs: self.session.remaining_secs(),
            at: Utc::now(),
        })
    }

    /// Stop the clock. `None` if it was not running.
    pub fn stop(&mut self) -> Option<Event> {
        if !self.clock.stop() {
            return None;
        }
        self.render();
        Some(Event::TimerStopped {
            mode: self.session.mode(),
            remaining_secs: self.session.remaining_secs(),
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.stop()
    }

    /// Back to a stopped, full-length `work` session with the count zeroed.
    pub fn reset(&mut self) -> Option<Event> {
        self.clock.stop();
        self.session.reset();
        self.render();
        Some(Event::TimerReset {
            remaining_secs: self.session.remaining_secs(),
            at: Utc::now(),
        })
    }

    /// Jump to `mode`. Always leaves the clock stopped.
    pub fn switch_mode(&mut self, mode: SessionMode) -> Option<Event> {
        self.clock.stop();
        let from = self.session.mode();
        self.session.switch_mode(mode);
        self.render();
        Some(Event::ModeSwitched {
            from,
            to: mode,
            remaining_secs: self.session.remaining_secs(),
            at: Utc::now(),
        })
    }

    /// Apply one elapsed second. Returns `Some(SessionCompleted)` when the
    /// countdown reached zero and the next session began.
    ///
    /// Ignored while the clock is stopped. Hosts without a runtime call
    /// this by hand after `start()`.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.clock.is_running() {
            return None;
        }
        match self.session.tick() {
            TickOutcome::AtFloor => None,
            TickOutcome::Decremented { .. } => {
                self.render();
                None
            }
            TickOutcome::Completed(t) => {
                self.sound_alarm();
                self.render();
                info!(
                    from = %t.from,
                    to = %t.to,
                    completed_count = t.completed_count,
                    "session completed"
                );
                Some(Event::SessionCompleted {
                    from: t.from,
                    to: t.to,
                    completed_count: t.completed_count,
                    at: Utc::now(),
                })
            }
        }
    }

    /// Wait for the clock's next tick and apply it. Pends while stopped.
    pub async fn next_tick(&mut self) -> Option<Event> {
        self.clock.next_tick().await;
        self.tick()
    }

    // ── Settings transaction ─────────────────────────────────────────

    /// Commit a settings draft: validate, apply, persist.
    ///
    /// The current mode's countdown restarts at its (possibly new) full
    /// length even when its duration did not change. The clock keeps its
    /// running state. Returns the emitted events in order.
    pub fn apply_settings(&mut self, draft: &SettingsDraft) -> Vec<Event> {
        let mut events = Vec::new();
        let durations = draft.durations();
        let background = draft.background_or(&self.background_image).to_string();

        self.session.set_durations(durations);

        if background != self.background_image {
            let from = std::mem::replace(&mut self.background_image, background.clone());
            debug!(from = %from, to = %background, "background changed");
            events.push(Event::BackgroundChanged {
                from,
                to: background.clone(),
                fade_out_ms: BACKGROUND_FADE_OUT_MS,
                fade_in_ms: BACKGROUND_FADE_IN_MS,
                at: Utc::now(),
            });
        }

        self.session.restart_current();
        self.render();

        let persisted = self.store.save_or_log(&durations, &self.background_image);
        info!(
            pomodoro = durations.pomodoro,
            short = durations.short,
            long = durations.long,
            sequence = durations.sequence,
            persisted,
            "settings applied"
        );
        events.push(Event::SettingsApplied {
            durations,
            background_image: self.background_image.clone(),
            persisted,
            at: Utc::now(),
        });
        events
    }

    // ── Ambient audio ────────────────────────────────────────────────

    pub fn play_ambient(&mut self, track: &str) -> Option<Event> {
        self.ambient.play(track)
    }

    pub fn select_ambient(&mut self, track: &str) -> Option<Event> {
        self.ambient.select(track)
    }

    pub fn toggle_ambient(&mut self) -> Option<Event> {
        self.ambient.toggle()
    }

    pub fn stop_ambient(&mut self) -> Option<Event> {
        self.ambient.stop()
    }

    pub fn set_volume(&mut self, volume: f64) -> Option<Event> {
        self.ambient.set_volume(volume)
    }

    /// Cancel the clock and release the ambient handle. Safe to call twice.
    pub fn shutdown(&mut self) {
        self.clock.stop();
        self.ambient.stop();
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn render(&mut self) {
        let frame = self.frame();
        if let Some(view) = self.view.as_mut() {
            view.render(&frame);
        }
    }

    fn sound_alarm(&mut self) {
        if let Some(alarm) = self.alarm.as_mut() {
            if let Err(e) = alarm.play() {
                warn!(error = %e, "completion alarm failed");
            }
        }
    }
}

impl Drop for TimerController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
