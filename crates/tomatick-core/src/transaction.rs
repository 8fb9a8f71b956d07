//! Settings transaction input.
//!
//! A [`SettingsDraft`] holds the raw values of the settings form. Validation
//! never rejects the draft: a field that does not parse, or parses below one
//! minute, is replaced by its built-in default.

use serde::{Deserialize, Serialize};

use crate::assets::is_known_background;
use crate::timer::{Durations, DEFAULT_LONG_MIN, DEFAULT_POMODORO_MIN, DEFAULT_SHORT_MIN};

/// Fade-out half of the background swap.
pub const BACKGROUND_FADE_OUT_MS: u64 = 400;
/// Fade-in half of the background swap.
pub const BACKGROUND_FADE_IN_MS: u64 = 400;

/// Raw, unvalidated settings as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsDraft {
    pub pomodoro: String,
    pub short: String,
    pub long: String,
    pub sequence: bool,
    pub background_image: String,
}

impl SettingsDraft {
    /// Draft pre-filled with the current values, as the settings panel opens.
    pub fn from_current(durations: &Durations, background_image: &str) -> Self {
        Self {
            pomodoro: durations.pomodoro.to_string(),
            short: durations.short.to_string(),
            long: durations.long.to_string(),
            sequence: durations.sequence,
            background_image: background_image.to_string(),
        }
    }

    /// Validated durations. Each field falls back to its hard default, never
    /// to the previous value.
    pub fn durations(&self) -> Durations {
        Durations {
            pomodoro: parse_minutes(&self.pomodoro, DEFAULT_POMODORO_MIN),
            short: parse_minutes(&self.short, DEFAULT_SHORT_MIN),
            long: parse_minutes(&self.long, DEFAULT_LONG_MIN),
            sequence: self.sequence,
        }
    }

    /// Background to commit: the drafted one if it is in the catalog,
    /// otherwise `current`.
    pub fn background_or<'a>(&'a self, current: &'a str) -> &'a str {
        let drafted = self.background_image.trim();
        if is_known_background(drafted) {
            drafted
        } else {
            current
        }
    }
}

/// Parse a minute count the forgiving way: surrounding whitespace and an
/// optional sign are accepted and trailing garbage is ignored ("12abc" is
/// 12). No leading digits, or a result below one, yields `default`.
pub fn parse_minutes(input: &str, default: u32) -> u32 {
    match parse_leading_int(input) {
        Some(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => default,
    }
}

fn parse_leading_int(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate absurdly long inputs instead of failing.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_numbers_parse() {
        assert_eq!(parse_minutes("30", 25), 30);
        assert_eq!(parse_minutes("  7 ", 5), 7);
        assert_eq!(parse_minutes("+12", 10), 12);
    }

    #[test]
    fn leading_integer_wins() {
        assert_eq!(parse_minutes("12abc", 25), 12);
        assert_eq!(parse_minutes("3.9", 25), 3);
        assert_eq!(parse_minutes("45 minutes", 25), 45);
    }

    #[test]
    fn invalid_or_small_values_use_hard_default() {
        assert_eq!(parse_minutes("", 25), 25);
        assert_eq!(parse_minutes("abc", 5), 5);
        assert_eq!(parse_minutes("0", 10), 10);
        assert_eq!(parse_minutes("-4", 25), 25);
        assert_eq!(parse_minutes("-", 25), 25);
    }

    #[test]
    fn huge_values_saturate() {
        assert_eq!(parse_minutes("99999999999999999999999", 25), u32::MAX);
    }

    #[test]
    fn draft_defaults_each_field_independently() {
        let draft = SettingsDraft {
            pomodoro: "oops".into(),
            short: "3".into(),
            long: "0".into(),
            sequence: true,
            background_image: "photo2.webp".into(),
        };
        assert_eq!(
            draft.durations(),
            Durations {
                pomodoro: 25,
                short: 3,
                long: 10,
                sequence: true
            }
        );
    }

    #[test]
    fn unknown_background_keeps_current() {
        let mut draft = SettingsDraft::from_current(&Durations::default(), "photo1.webp");
        draft.background_image = "wallpaper.png".into();
        assert_eq!(draft.background_or("photo4.webp"), "photo4.webp");
        draft.background_image = "photo5.webp".into();
        assert_eq!(draft.background_or("photo4.webp"), "photo5.webp");
    }
}
