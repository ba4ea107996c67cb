//! Background audio conditioning.
//!
//! The supplied track is looped and cut to the exact video duration, then
//! re-encoded to mp3 inside the run's scratch directory.

use crate::error::{CoreError, CoreResult};
use crate::external::{ToolInvocation, ToolRunner, Toolchain, probe_duration};
use crate::temp_files::CONDITIONED_AUDIO_NAME;
use crate::utils::{format_seconds_arg, get_filename_safe};

use std::path::{Path, PathBuf};

/// Returns `ceil(required / source)`, the `-stream_loop` value for the track.
///
/// `-stream_loop n` plays the input n+1 times, so the output always has one
/// spare pass that `-t` truncates.
#[must_use]
pub fn loop_count(required_secs: f64, source_secs: f64) -> u32 {
    (required_secs / source_secs).ceil().max(1.0) as u32
}

/// Loops and truncates `audio_path` to `required_secs`, writing
/// `processed_audio.mp3` into `scratch_dir`.
///
/// # Returns
///
/// * `Ok(PathBuf)` - The conditioned track
/// * `Err(_)` - Duration unavailable or non-positive, ffmpeg failure or timeout
pub fn condition_audio<R: ToolRunner>(
    tools: &Toolchain<R>,
    audio_path: &Path,
    required_secs: f64,
    scratch_dir: &Path,
) -> CoreResult<PathBuf> {
    if required_secs <= 0.0 || !required_secs.is_finite() {
        return Err(CoreError::OperationFailed(format!(
            "required audio duration must be positive, got {}",
            required_secs
        )));
    }

    let source_secs = probe_duration(tools, audio_path)?;
    if source_secs <= 0.0 || !source_secs.is_finite() {
        return Err(CoreError::OperationFailed(format!(
            "audio '{}' has unusable duration {}",
            get_filename_safe(audio_path),
            source_secs
        )));
    }

    let loops = loop_count(required_secs, source_secs);
    log::debug!(
        "Conditioning {}: source {:.2}s, required {:.2}s, stream_loop {}",
        audio_path.display(),
        source_secs,
        required_secs,
        loops
    );

    let output_path = scratch_dir.join(CONDITIONED_AUDIO_NAME);
    let invocation = ToolInvocation::new("ffmpeg (audio)", &tools.paths().ffmpeg)
        .args(["-y", "-hide_banner", "-loglevel", "error"])
        .arg("-stream_loop")
        .arg(loops.to_string())
        .arg("-i")
        .arg(audio_path)
        .arg("-t")
        .arg(format_seconds_arg(required_secs))
        .args(["-vn", "-acodec", "libmp3lame", "-b:a"])
        .arg(&tools.config().audio_bitrate)
        .args(["-f", "mp3"])
        .arg(&output_path)
        .timeout(tools.config().audio_timeout);

    tools
        .run(&invocation)?
        .into_checked(&invocation.label)?;

    Ok(output_path)
}
