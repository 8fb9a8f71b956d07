use tomatick_core::assets::{
    AMBIENT_TRACKS, BACKGROUNDS, DEFAULT_AMBIENT_TRACK, FALLBACK_BACKGROUND,
};

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        let value = serde_json::json!({
            "backgrounds": BACKGROUNDS,
            "fallback_background": FALLBACK_BACKGROUND,
            "ambient_tracks": AMBIENT_TRACKS,
            "default_ambient_track": DEFAULT_AMBIENT_TRACK,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Backgrounds:");
    for id in BACKGROUNDS {
        let marker = if *id == FALLBACK_BACKGROUND { " (default)" } else { "" };
        println!("  {id}{marker}");
    }
    println!("Ambient tracks:");
    for id in AMBIENT_TRACKS {
        let marker = if *id == DEFAULT_AMBIENT_TRACK { " (default)" } else { "" };
        println!("  {id}{marker}");
    }
    Ok(())
}
