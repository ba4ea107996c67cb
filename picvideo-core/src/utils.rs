//! Utility functions for formatting and path handling.

use std::path::Path;

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats a seconds value for an ffmpeg argument (15.0 -> "15", 2.5 -> "2.5").
///
/// Uses the shortest representation that round-trips, in plain decimal
/// notation, so tiny values never collapse to zero.
#[must_use]
pub fn format_seconds_arg(seconds: f64) -> String {
    format!("{seconds}")
}

/// Returns the file name of a path as a String, or the full path when it has none.
#[must_use]
pub fn get_filename_safe(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
