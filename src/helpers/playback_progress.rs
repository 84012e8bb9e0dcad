//! Formatting helpers for playback positions

/// Format a duration in milliseconds as `m:ss`, e.g. 222000 -> "3:42"
pub fn format_duration(ms: u64) -> String {
    let total_seconds = ms / 1000;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}:{:02}", minutes, seconds)
}

/// Playback progress as a percentage in the range 0-100.
///
/// Returns 0 when the length is unknown (zero or negative).
pub fn calculate_progress(seek: f64, length: f64) -> f64 {
    if length <= 0.0 {
        return 0.0;
    }
    ((seek / length) * 100.0).clamp(0.0, 100.0)
}
