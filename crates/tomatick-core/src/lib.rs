//! # Tomatick Core Library
//!
//! This library provides the core logic for the Tomatick Pomodoro timer.
//! Front ends (the bundled CLI, or any other presentation layer) render what
//! the core tells them and forward user input; every rule lives here.
//!
//! ## Architecture
//!
//! - **Timer**: a session state machine driven one `tick()` per second by a
//!   countdown clock that owns the repeating tick task
//! - **Storage**: the persisted settings record behind a key-value seam
//!   (SQLite, JSON file or memory) and TOML-based application configuration
//! - **Audio**: an ambient loop player with single-handle ownership and a
//!   completion alarm seam
//! - **Transaction**: forgiving validation of edited settings
//!
//! ## Key Components
//!
//! - [`TimerController`]: owner of all mutable state
//! - [`SessionMachine`]: mode transitions and remaining time
//! - [`CountdownClock`]: the guarded, cancellable one-second tick
//! - [`AmbientPlayer`]: looping background audio
//! - [`ConfigStore`]: load/save of the settings record

pub mod assets;
pub mod audio;
pub mod controller;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;
pub mod transaction;

pub use audio::{AlarmCue, AmbientPlayer, AmbientState, AudioBackend, PlaybackHandle};
pub use controller::TimerController;
pub use error::{AudioError, ConfigError, CoreError, StorageError};
pub use events::Event;
pub use storage::{AppConfig, ConfigStore, Database, KeyValueStore, PersistedRecord};
pub use timer::{CountdownClock, DisplayFrame, Durations, SessionMachine, SessionMode, TimerView};
pub use transaction::SettingsDraft;
