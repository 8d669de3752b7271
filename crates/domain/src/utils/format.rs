//! Display formatting for durations, distances, and paces.

use chrono::Duration;

/// Format a duration as `h:mm:ss` when it reaches an hour, otherwise `m:ss`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Format a distance in meters as kilometers with two decimals.
/// e.g. 15012.34 -> "15.01"
#[must_use]
pub fn format_distance_km(distance_meters: f64) -> String {
    format!("{:.2}", distance_meters / 1000.0)
}

/// Format a pace in seconds per kilometer as `m:ss`.
/// e.g. 325.0 -> "5:25"
#[must_use]
pub fn format_pace(seconds_per_km: f64) -> String {
    let total_seconds = seconds_per_km.max(0.0) as i64;
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes}:{seconds:02}")
}
