//! Configuration structures and constants for the picvideo-core library.
//!
//! This module provides the configuration for the slideshow pipeline: where
//! the external tools live, where scratch files go, how long each external
//! invocation may run, and the fixed encoding parameters of the output.

mod builder;

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{CoreError, CoreResult};

pub use builder::CoreConfigBuilder;

// Default constants

/// Timeout for short probes (image dimensions, audio duration, metadata, codec list).
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for composing a single frame.
pub const DEFAULT_FRAME_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for looping/truncating the background audio.
pub const DEFAULT_AUDIO_TIMEOUT: Duration = Duration::from_secs(120);

/// Encoder used when the ffmpeg build lists it.
pub const DEFAULT_PREFERRED_ENCODER: &str = "libx264";

/// Baseline encoder name used otherwise.
pub const DEFAULT_FALLBACK_ENCODER: &str = "h264";

/// Pixel format shared by both encoder choices.
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";

/// Constant video bitrate of the output.
pub const DEFAULT_VIDEO_BITRATE: &str = "8M";

/// Bitrate of both the conditioned mp3 track and the muxed aac track.
pub const DEFAULT_AUDIO_BITRATE: &str = "192k";

/// Output frame rate. Still frames are read at 1/duration fps and resampled to this.
pub const DEFAULT_OUTPUT_FPS: u32 = 25;

/// Main configuration structure for the picvideo-core library.
///
/// All fields have working defaults; a caller usually only overrides tool
/// locations and the scratch base directory.
///
/// # Examples
///
/// ```rust,no_run
/// use picvideo_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = CoreConfigBuilder::new()
///     .tools_dir(PathBuf::from("./thirdparty"))
///     .temp_dir(PathBuf::from("/tmp/picvideo"))
///     .build();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Explicit path to the ffmpeg binary
    pub ffmpeg_path: Option<PathBuf>,

    /// Explicit path to the ffprobe binary
    pub ffprobe_path: Option<PathBuf>,

    /// Explicit path to the exiftool binary
    pub exiftool_path: Option<PathBuf>,

    /// Directory searched for tools that are neither configured explicitly nor on `PATH`
    pub tools_dir: Option<PathBuf>,

    /// Base directory for per-run scratch directories (defaults to the system temp dir)
    pub temp_dir: Option<PathBuf>,

    pub probe_timeout: Duration,
    pub frame_timeout: Duration,
    pub audio_timeout: Duration,

    pub preferred_encoder: String,
    pub fallback_encoder: String,
    pub pixel_format: String,
    pub video_bitrate: String,
    pub audio_bitrate: String,
    pub output_fps: u32,

    /// Font used for captions; ffmpeg's fontconfig default when unset
    pub font_file: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            exiftool_path: None,
            tools_dir: None,
            temp_dir: None,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            frame_timeout: DEFAULT_FRAME_TIMEOUT,
            audio_timeout: DEFAULT_AUDIO_TIMEOUT,
            preferred_encoder: DEFAULT_PREFERRED_ENCODER.to_string(),
            fallback_encoder: DEFAULT_FALLBACK_ENCODER.to_string(),
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
            video_bitrate: DEFAULT_VIDEO_BITRATE.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            output_fps: DEFAULT_OUTPUT_FPS,
            font_file: None,
        }
    }
}

impl CoreConfig {
    /// Creates a configuration with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks the configuration for values the pipeline cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        for (name, timeout) in [
            ("probe_timeout", self.probe_timeout),
            ("frame_timeout", self.frame_timeout),
            ("audio_timeout", self.audio_timeout),
        ] {
            if timeout.is_zero() {
                return Err(CoreError::Config(format!("{name} must be greater than zero")));
            }
        }

        if self.output_fps == 0 {
            return Err(CoreError::Config("output_fps must be greater than zero".to_string()));
        }

        for (name, value) in [
            ("preferred_encoder", &self.preferred_encoder),
            ("fallback_encoder", &self.fallback_encoder),
            ("pixel_format", &self.pixel_format),
            ("video_bitrate", &self.video_bitrate),
            ("audio_bitrate", &self.audio_bitrate),
        ] {
            if value.trim().is_empty() {
                return Err(CoreError::Config(format!("{name} must not be empty")));
            }
        }

        if let Some(font) = &self.font_file {
            if !font.is_file() {
                return Err(CoreError::Config(format!(
                    "font file '{}' does not exist",
                    font.display()
                )));
            }
        }

        if let Some(dir) = &self.tools_dir {
            if !dir.is_dir() {
                return Err(CoreError::Config(format!(
                    "tools directory '{}' does not exist",
                    dir.display()
                )));
            }
        }

        Ok(())
    }
}
