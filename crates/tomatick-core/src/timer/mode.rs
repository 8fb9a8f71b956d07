use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_POMODORO_MIN: u32 = 25;
pub const DEFAULT_SHORT_MIN: u32 = 5;
pub const DEFAULT_LONG_MIN: u32 = 10;

/// Every Nth completed work session is followed by a long break when
/// sequencing is enabled.
pub const LONG_BREAK_EVERY: u32 = 4;

/// One of the three timer phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Work => "work",
            SessionMode::ShortBreak => "short-break",
            SessionMode::LongBreak => "long-break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, SessionMode::Work)
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" | "pomodoro" => Ok(SessionMode::Work),
            "short-break" | "short" => Ok(SessionMode::ShortBreak),
            "long-break" | "long" => Ok(SessionMode::LongBreak),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Per-mode durations in minutes plus the sequencing flag.
///
/// Serialized with the persisted record's field names. Deserializing runs
/// through [`Durations::new`], so a zero duration becomes that field's
/// default. Struct literals can still hold zeros; the session machine
/// normalizes whatever it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawDurations")]
pub struct Durations {
    pub pomodoro: u32,
    pub short: u32,
    pub long: u32,
    pub sequence: bool,
}

impl Durations {
    /// Build durations, replacing any value below one minute with that
    /// field's default.
    pub fn new(pomodoro: u32, short: u32, long: u32, sequence: bool) -> Self {
        Self {
            pomodoro: at_least_one(pomodoro, DEFAULT_POMODORO_MIN),
            short: at_least_one(short, DEFAULT_SHORT_MIN),
            long: at_least_one(long, DEFAULT_LONG_MIN),
            sequence,
        }
    }

    /// Same durations with every zero replaced by its default.
    pub fn normalized(self) -> Self {
        Self::new(self.pomodoro, self.short, self.long, self.sequence)
    }

    pub fn minutes(&self, mode: SessionMode) -> u32 {
        match mode {
            SessionMode::Work => self.pomodoro,
            SessionMode::ShortBreak => self.short,
            SessionMode::LongBreak => self.long,
        }
    }

    /// Full length of `mode` in seconds.
    ///
    /// Uses saturating arithmetic so absurd persisted values cannot overflow.
    pub fn seconds(&self, mode: SessionMode) -> u64 {
        u64::from(self.minutes(mode)).saturating_mul(60)
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            pomodoro: DEFAULT_POMODORO_MIN,
            short: DEFAULT_SHORT_MIN,
            long: DEFAULT_LONG_MIN,
            sequence: false,
        }
    }
}

#[derive(Deserialize)]
struct RawDurations {
    pomodoro: u32,
    short: u32,
    long: u32,
    sequence: bool,
}

impl From<RawDurations> for Durations {
    fn from(raw: RawDurations) -> Self {
        Durations::new(raw.pomodoro, raw.short, raw.long, raw.sequence)
    }
}

fn at_least_one(value: u32, default: u32) -> u32 {
    if value < 1 {
        default
    } else {
        value
    }
}
