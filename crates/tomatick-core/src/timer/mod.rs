mod clock;
mod display;
mod mode;
mod session;

pub use clock::{ClockTick, CountdownClock, TICK_PERIOD};
pub use display::{format_mmss, progress_fraction, DisplayFrame, TimerView};
pub use mode::{
    Durations, SessionMode, DEFAULT_LONG_MIN, DEFAULT_POMODORO_MIN, DEFAULT_SHORT_MIN,
    LONG_BREAK_EVERY,
};
pub use session::{SessionMachine, TickOutcome, Transition};
