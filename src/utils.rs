use std::time::Duration;

use chrono::{DateTime, Local};

/// Default playlist title, e.g. `TxtToYoutubeMusic_261016143005`.
pub fn default_playlist_title(now: DateTime<Local>) -> String {
    format!("TxtToYoutubeMusic_{}", now.format("%y%m%d%H%M%S"))
}

/// Log file name derived from the run start time.
pub fn log_file_name(started_at: DateTime<Local>) -> String {
    format!("txttoytmusic_{}.log", started_at.format("%Y%m%d_%H%M%S"))
}

pub fn playlist_url(playlist_id: &str) -> String {
    format!("https://music.youtube.com/playlist?list={}", playlist_id)
}

/// Formats a duration as `M min. S sec.`, dropping minutes when zero.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let minutes = total / 60;
    let seconds = total % 60;

    if minutes > 0 {
        format!("{} min. {} sec.", minutes, seconds)
    } else {
        format!("{} sec.", seconds)
    }
}

/// Removes characters the playlist API refuses in descriptions.
pub fn sanitize_description(description: &str) -> String {
    description.replace(['<', '>'], "")
}
