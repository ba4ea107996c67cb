// picvideo-cli/src/config.rs
//
// Defines default configuration constants for the `picvideo` command line.

/// Images beyond this count are dropped from a run.
pub const DEFAULT_MAX_IMAGES: usize = 100;

/// Seconds each image is shown.
pub const DEFAULT_DURATION_SECS: f64 = 7.0;

pub const DEFAULT_OUTPUT: &str = "output.mp4";
pub const DEFAULT_PREVIEW: &str = "preview.png";

/// Prefix of the per-run log file name.
pub const LOG_FILE_PREFIX: &str = "picvideo_run_";
