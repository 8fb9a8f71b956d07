//! Fixed asset catalogs.
//!
//! The core treats backgrounds and ambient tracks as opaque identifiers; it
//! never opens the files behind them.

/// Background images offered by the settings panel.
pub const BACKGROUNDS: &[&str] = &[
    "photo1.webp",
    "photo2.webp",
    "photo3.webp",
    "photo4.webp",
    "photo5.webp",
    "photo6.webp",
];

/// Background used when nothing has been persisted yet.
pub const FALLBACK_BACKGROUND: &str = "photo1.webp";

/// Looping ambient tracks.
pub const AMBIENT_TRACKS: &[&str] = &["rain", "forest", "waves", "cafe", "fireplace", "white-noise"];

/// Track the on/off control plays when nothing was selected before.
pub const DEFAULT_AMBIENT_TRACK: &str = "rain";

pub fn is_known_background(id: &str) -> bool {
    BACKGROUNDS.contains(&id)
}

pub fn is_known_track(id: &str) -> bool {
    AMBIENT_TRACKS.contains(&id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_in_their_catalogs() {
        assert!(is_known_background(FALLBACK_BACKGROUND));
        assert!(is_known_track(DEFAULT_AMBIENT_TRACK));
        assert!(!is_known_track(""));
    }
}
