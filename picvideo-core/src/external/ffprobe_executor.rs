//! FFprobe integration for image and audio analysis
//!
//! Two probes are used by the pipeline: the pixel dimensions of a still image
//! (plain CSV output) and the container duration of an audio file (JSON output).
use crate::error::{CoreError, CoreResult};
use crate::external::{ToolInvocation, ToolRunner, Toolchain};
use serde::Deserialize;
use std::path::Path;

/// Reads the width and height of the first video stream of an image.
///
/// Runs `ffprobe -v error -select_streams v:0 -show_entries stream=width,height -of csv=p=0`
/// bounded by the configured probe timeout.
pub fn probe_image_dimensions<R: ToolRunner>(
    tools: &Toolchain<R>,
    image_path: &Path,
) -> CoreResult<(u32, u32)> {
    log::debug!("Probing dimensions of {}", image_path.display());
    let invocation = ToolInvocation::new("ffprobe (dimensions)", &tools.paths().ffprobe)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-of",
            "csv=p=0",
        ])
        .arg(image_path)
        .timeout(tools.config().probe_timeout);

    let output = tools.run(&invocation)?.into_checked(&invocation.label)?;
    parse_dimensions(&output.stdout)
}

/// Parses `width,height` CSV output. Only the first non-empty line is read.
pub fn parse_dimensions(stdout: &str) -> CoreResult<(u32, u32)> {
    let line = stdout
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| CoreError::FfprobeParse("empty dimension output".to_string()))?;

    let mut parts = line.split(',').map(str::trim).filter(|p| !p.is_empty());
    let (Some(w), Some(h)) = (parts.next(), parts.next()) else {
        return Err(CoreError::FfprobeParse(format!(
            "expected 'width,height', got '{}'",
            line
        )));
    };

    let width: u32 = w
        .parse()
        .map_err(|_| CoreError::FfprobeParse(format!("invalid width '{}'", w)))?;
    let height: u32 = h
        .parse()
        .map_err(|_| CoreError::FfprobeParse(format!("invalid height '{}'", h)))?;

    if width == 0 || height == 0 {
        return Err(CoreError::InvalidDimensions(format!("{}x{}", width, height)));
    }
    Ok((width, height))
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Reads the container duration of an audio file, in seconds.
pub fn probe_duration<R: ToolRunner>(tools: &Toolchain<R>, media_path: &Path) -> CoreResult<f64> {
    log::debug!("Probing duration of {}", media_path.display());
    let invocation = ToolInvocation::new("ffprobe (duration)", &tools.paths().ffprobe)
        .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
        .arg(media_path)
        .timeout(tools.config().probe_timeout);

    let output = tools.run(&invocation)?.into_checked(&invocation.label)?;
    parse_duration_json(&output.stdout)
}

/// Extracts `format.duration` from ffprobe JSON output.
pub fn parse_duration_json(stdout: &str) -> CoreResult<f64> {
    let parsed: ProbeOutput =
        serde_json::from_str(stdout).map_err(|e| CoreError::JsonParseError(e.to_string()))?;

    let raw = parsed
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| CoreError::FfprobeParse("no format.duration in output".to_string()))?;

    raw.trim()
        .parse::<f64>()
        .map_err(|_| CoreError::FfprobeParse(format!("invalid duration '{}'", raw)))
}
