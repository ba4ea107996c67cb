// ============================================================================
// picvideo-core/src/processing/slideshow.rs
// ============================================================================
//
// SEQUENCE ASSEMBLY: Images and audio to one slideshow video
//
// This module houses the orchestration of a slideshow run. It composes every
// source image into a frame, optionally conditions the background audio to the
// resulting duration, picks an encoder and muxes everything into the output.
//
// KEY COMPONENTS:
// - SlideshowRequest: what to build
// - SlideshowAssembler: runs the pipeline against injected tool seams
// - RunSummary: what was built
// - build_mux_command: the final ffmpeg invocation
//
// WORKFLOW:
// Idle -> ProcessingImages -> (AudioConditioning)? -> Muxing -> Done | Failed
//
// 1. Create the run's scratch directory
// 2. Compose each image; failures are logged and skipped, every attempt is
//    reported as processing progress
// 3. Zero composed frames fails the run
// 4. Condition audio to frames * seconds; failure drops the audio
// 5. Probe the encoder and mux, reporting indeterminate compiling progress
// 6. The scratch directory is removed on every exit path
//
// The cancellation token is checked before each image, before audio
// conditioning and before muxing. Running tools are never interrupted.

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult, command_failed_error};
use crate::external::ffmpeg_executor::command_args;
use crate::external::{FfmpegProcess, FfmpegSpawner, ToolRunner, Toolchain};
use crate::job::CancellationToken;
use crate::processing::audio::condition_audio;
use crate::processing::encoder::{EncoderChoice, select_encoder};
use crate::processing::frame::{CaptionSource, ComposedFrame, compose_frame};
use crate::progress_reporting::{LogFacadeSink, LogSink, ProgressUpdate};
use crate::temp_files::{FRAME_PATTERN, create_scratch_dir, frame_path};
use crate::utils::{format_duration, format_seconds_arg, get_filename_safe};

// ---- External crate imports ----
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};

// ---- Standard library imports ----
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Advisory compiling value reported while the mux is running.
const MUX_RUNNING_PERCENT: u32 = 85;

/// Minimum spacing of advisory compiling updates.
const MUX_PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

// ============================================================================
// REQUEST AND RESULT
// ============================================================================

/// Inputs of one slideshow run.
#[derive(Debug, Clone, PartialEq)]
pub struct SlideshowRequest {
    /// Source images in presentation order
    pub images: Vec<PathBuf>,
    /// Seconds each composed frame stays on screen
    pub per_image_seconds: f64,
    pub output_path: PathBuf,
    pub audio_path: Option<PathBuf>,
    /// Caption drawn on every frame; metadata captions when unset
    pub caption: Option<String>,
}

impl SlideshowRequest {
    pub fn new(images: Vec<PathBuf>, per_image_seconds: f64, output_path: PathBuf) -> Self {
        Self {
            images,
            per_image_seconds,
            output_path,
            audio_path: None,
            caption: None,
        }
    }

    #[must_use]
    pub fn with_audio(mut self, audio_path: Option<PathBuf>) -> Self {
        self.audio_path = audio_path;
        self
    }

    #[must_use]
    pub fn with_caption(mut self, caption: Option<String>) -> Self {
        self.caption = caption;
        self
    }

    /// Rejects requests no run could satisfy.
    pub fn validate(&self) -> CoreResult<()> {
        if self.images.is_empty() {
            return Err(CoreError::NoFilesFound);
        }
        if !self.per_image_seconds.is_finite() || self.per_image_seconds <= 0.0 {
            return Err(CoreError::Config(format!(
                "per-image duration must be positive, got {}",
                self.per_image_seconds
            )));
        }
        Ok(())
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output_path: PathBuf,
    pub frames_composed: usize,
    pub frames_skipped: usize,
    pub total_duration_secs: f64,
    pub audio_included: bool,
    pub encoder: EncoderChoice,
}

/// Stages of a run, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    ProcessingImages,
    AudioConditioning,
    Muxing,
    Done,
    Failed,
}

impl PipelineState {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineState::Idle => "idle",
            PipelineState::ProcessingImages => "processing images",
            PipelineState::AudioConditioning => "conditioning audio",
            PipelineState::Muxing => "muxing",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        }
    }
}

// ============================================================================
// MUX COMMAND
// ============================================================================

/// Inputs of the final mux invocation.
#[derive(Debug, Clone)]
pub struct MuxPlan<'a> {
    pub frames_dir: &'a Path,
    pub per_image_seconds: f64,
    pub total_duration_secs: f64,
    /// Canvas every frame is normalized onto; must be even in both dimensions
    pub canvas: (u32, u32),
    pub audio: Option<&'a Path>,
    pub encoder: &'a EncoderChoice,
    pub output_fps: u32,
    pub audio_bitrate: &'a str,
    pub output_path: &'a Path,
}

/// Rounds a frame size up to even dimensions, as yuv420p requires.
#[must_use]
pub fn even_canvas(width: u32, height: u32) -> (u32, u32) {
    (width + width % 2, height + height % 2)
}

/// Builds the ffmpeg command that turns the frame sequence (and audio) into the output.
pub fn build_mux_command(ffmpeg: &Path, plan: &MuxPlan<'_>) -> FfmpegCommand {
    let (cw, ch) = plan.canvas;
    let mut cmd = FfmpegCommand::new_with_path(ffmpeg);

    cmd.overwrite()
        .arg("-framerate")
        .arg(format!("1/{}", format_seconds_arg(plan.per_image_seconds)))
        .arg("-start_number")
        .arg("0")
        .input(plan.frames_dir.join(FRAME_PATTERN));

    if let Some(audio) = plan.audio {
        cmd.input(audio);
    }

    cmd.arg("-vf")
        .arg(format!(
            "scale=w={cw}:h={ch}:force_original_aspect_ratio=decrease,pad=w={cw}:h={ch}:x=(ow-iw)/2:y=(oh-ih)/2:color=black"
        ))
        .arg("-c:v")
        .arg(&plan.encoder.codec)
        .arg("-b:v")
        .arg(&plan.encoder.bitrate)
        .arg("-r")
        .arg(plan.output_fps.to_string())
        .arg("-pix_fmt")
        .arg(&plan.encoder.pixel_format)
        .arg("-t")
        .arg(format_seconds_arg(plan.total_duration_secs))
        .arg("-movflags")
        .arg("+faststart");

    if plan.audio.is_some() {
        cmd.args(["-c:a", "aac", "-b:a", plan.audio_bitrate])
            .args(["-map", "0:v:0", "-map", "1:a:0"]);
    } else {
        cmd.args(["-map", "0:v:0", "-an"]);
    }

    cmd.output(plan.output_path);
    cmd
}

// ============================================================================
// ASSEMBLER
// ============================================================================

/// Runs slideshow requests against a toolchain and an ffmpeg spawner.
pub struct SlideshowAssembler<R: ToolRunner, S: FfmpegSpawner> {
    tools: Toolchain<R>,
    spawner: S,
    sink: Arc<dyn LogSink>,
    cancel: CancellationToken,
}

impl<R: ToolRunner, S: FfmpegSpawner> SlideshowAssembler<R, S> {
    pub fn new(tools: Toolchain<R>, spawner: S) -> Self {
        Self {
            tools,
            spawner,
            sink: Arc::new(LogFacadeSink),
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = sink;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Runs one request to completion.
    ///
    /// # Arguments
    ///
    /// * `request` - Images, duration, output and optional audio/caption
    /// * `progress` - Receives processing and compiling updates on this thread
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The output was written
    /// * `Err(CoreError::NoFramesComposed)` - Every image failed
    /// * `Err(CoreError::Cancelled)` - The token was cancelled
    /// * `Err(_)` - Scratch setup or mux failure
    pub fn run(
        &self,
        request: &SlideshowRequest,
        progress: &mut dyn FnMut(ProgressUpdate),
    ) -> CoreResult<RunSummary> {
        self.enter(PipelineState::Idle);
        let result = self.run_stages(request, progress);
        match &result {
            Ok(summary) => {
                self.enter(PipelineState::Done);
                self.sink.info(&format!(
                    "Video created: {} ({} frames, {}{})",
                    summary.output_path.display(),
                    summary.frames_composed,
                    format_duration(summary.total_duration_secs),
                    if summary.audio_included { ", with audio" } else { "" }
                ));
            }
            Err(e) => {
                self.enter(PipelineState::Failed);
                self.sink.error(&format!("Video creation failed: {}", e));
            }
        }
        result
    }

    fn run_stages(
        &self,
        request: &SlideshowRequest,
        progress: &mut dyn FnMut(ProgressUpdate),
    ) -> CoreResult<RunSummary> {
        request.validate()?;

        // Dropped on every return below, taking frames and audio with it.
        let scratch = create_scratch_dir(self.tools.config())?;
        log::debug!("Scratch directory: {}", scratch.path().display());

        // ---- Images ----
        self.enter(PipelineState::ProcessingImages);
        let frames = self.compose_all(request, scratch.path(), progress)?;
        let frames_skipped = request.images.len() - frames.len();
        let total_duration_secs = frames.len() as f64 * request.per_image_seconds;

        // ---- Audio ----
        let audio = match &request.audio_path {
            Some(audio_path) => {
                self.check_cancelled()?;
                self.enter(PipelineState::AudioConditioning);
                match condition_audio(&self.tools, audio_path, total_duration_secs, scratch.path()) {
                    Ok(path) => Some(path),
                    Err(e) => {
                        self.sink.warn(&format!(
                            "Audio processing failed, continuing without audio: {}",
                            e
                        ));
                        None
                    }
                }
            }
            None => None,
        };

        // ---- Mux ----
        self.check_cancelled()?;
        self.enter(PipelineState::Muxing);
        progress(ProgressUpdate::compiling(0, 0));
        self.sink.info("Compiling video...");

        let encoder = select_encoder(&self.tools);
        if encoder.is_fallback {
            self.sink.warn(&format!(
                "Preferred encoder {} unavailable, using {}",
                self.tools.config().preferred_encoder,
                encoder.codec
            ));
        } else {
            self.sink.info(&format!("Using encoder: {}", encoder.codec));
        }

        let first = &frames[0].spec;
        let config = self.tools.config();
        let plan = MuxPlan {
            frames_dir: scratch.path(),
            per_image_seconds: request.per_image_seconds,
            total_duration_secs,
            canvas: even_canvas(first.background_width, first.total_height),
            audio: audio.as_deref(),
            encoder: &encoder,
            output_fps: config.output_fps,
            audio_bitrate: &config.audio_bitrate,
            output_path: &request.output_path,
        };

        ensure_parent_dir(&request.output_path)?;
        let cmd = build_mux_command(&self.tools.paths().ffmpeg, &plan);
        self.mux(cmd, progress)?;
        progress(ProgressUpdate::compiling(100, 100));

        if let Err(e) = scratch.close() {
            self.sink.warn(&format!("Failed to remove scratch directory: {}", e));
        }

        Ok(RunSummary {
            output_path: request.output_path.clone(),
            frames_composed: frames.len(),
            frames_skipped,
            total_duration_secs,
            audio_included: audio.is_some(),
            encoder,
        })
    }

    fn compose_all(
        &self,
        request: &SlideshowRequest,
        scratch: &Path,
        progress: &mut dyn FnMut(ProgressUpdate),
    ) -> CoreResult<Vec<ComposedFrame>> {
        let total = request.images.len();
        self.sink.info(&format!("Processing {} images", total));

        let mut frames = Vec::with_capacity(total);
        for (index, image) in request.images.iter().enumerate() {
            self.check_cancelled()?;

            // Indexed by successes so the sequence has no gaps.
            let dest = frame_path(scratch, frames.len());
            match compose_frame(&self.tools, image, &dest, request.caption.as_deref()) {
                Ok(frame) => {
                    if frame.caption_source == CaptionSource::Date {
                        self.sink.warn(&format!(
                            "Camera metadata unavailable for {}, captioned with processing date",
                            get_filename_safe(image)
                        ));
                    }
                    self.sink.info(&format!(
                        "Processed image {}/{}: {}",
                        index + 1,
                        total,
                        get_filename_safe(image)
                    ));
                    frames.push(frame);
                }
                Err(e) => {
                    self.sink.warn(&format!(
                        "Skipping image {}/{} ({}): {}",
                        index + 1,
                        total,
                        get_filename_safe(image),
                        e
                    ));
                }
            }
            progress(ProgressUpdate::processing(to_u32(index + 1), to_u32(total)));
        }

        if frames.is_empty() {
            return Err(CoreError::NoFramesComposed);
        }
        Ok(frames)
    }

    fn mux(&self, cmd: FfmpegCommand, progress: &mut dyn FnMut(ProgressUpdate)) -> CoreResult<()> {
        log::debug!("Running mux command: ffmpeg {}", command_args(&cmd).join(" "));

        let mut process = self.spawner.spawn(cmd)?;
        let mut stderr = String::new();
        let mut last_update: Option<Instant> = None;

        process.handle_events(|event| {
            match &event {
                FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, line) | FfmpegEvent::Error(line) => {
                    stderr.push_str(line);
                    stderr.push('\n');
                }
                FfmpegEvent::Log(_, line) => log::trace!("ffmpeg: {}", line),
                _ => {}
            }

            if last_update.is_none_or(|t| t.elapsed() >= MUX_PROGRESS_INTERVAL) {
                last_update = Some(Instant::now());
                progress(ProgressUpdate::compiling(MUX_RUNNING_PERCENT, 100));
            }
            Ok(())
        })?;

        let status = process.wait()?;
        if !status.success() {
            return Err(command_failed_error("ffmpeg (mux)", status, stderr.trim()));
        }
        Ok(())
    }

    fn check_cancelled(&self) -> CoreResult<()> {
        if self.cancel.is_cancelled() {
            self.sink.warn("Run cancelled");
            return Err(CoreError::Cancelled);
        }
        Ok(())
    }

    fn enter(&self, state: PipelineState) {
        log::debug!("Pipeline state: {}", state.as_str());
    }
}

fn ensure_parent_dir(path: &Path) -> CoreResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> EncoderChoice {
        EncoderChoice {
            codec: "libx264".to_string(),
            pixel_format: "yuv420p".to_string(),
            bitrate: "8M".to_string(),
            is_fallback: false,
        }
    }

    fn arg_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .map(String::as_str)
    }

    #[test]
    fn test_even_canvas() {
        assert_eq!(even_canvas(1920, 1296), (1920, 1296));
        assert_eq!(even_canvas(1001, 677), (1002, 678));
    }

    #[test]
    fn test_request_validation() {
        let ok = SlideshowRequest::new(vec![PathBuf::from("a.jpg")], 7.0, PathBuf::from("o.mp4"));
        assert!(ok.validate().is_ok());

        let empty = SlideshowRequest::new(vec![], 7.0, PathBuf::from("o.mp4"));
        assert!(matches!(empty.validate(), Err(CoreError::NoFilesFound)));

        for d in [0.0, -1.0, f64::NAN] {
            let bad = SlideshowRequest::new(vec![PathBuf::from("a.jpg")], d, PathBuf::from("o.mp4"));
            assert!(matches!(bad.validate(), Err(CoreError::Config(_))));
        }
    }

    #[test]
    fn test_mux_command_without_audio() {
        let enc = encoder();
        let plan = MuxPlan {
            frames_dir: Path::new("/scratch"),
            per_image_seconds: 5.0,
            total_duration_secs: 15.0,
            canvas: (1920, 1296),
            audio: None,
            encoder: &enc,
            output_fps: 25,
            audio_bitrate: "192k",
            output_path: Path::new("/out/video.mp4"),
        };
        let args = command_args(&build_mux_command(Path::new("ffmpeg"), &plan));

        assert!(args.iter().any(|a| a == "-y"));
        assert_eq!(arg_after(&args, "-framerate"), Some("1/5"));
        assert_eq!(arg_after(&args, "-start_number"), Some("0"));
        assert_eq!(arg_after(&args, "-i"), Some("/scratch/frame_%04d.png"));
        assert_eq!(arg_after(&args, "-c:v"), Some("libx264"));
        assert_eq!(arg_after(&args, "-b:v"), Some("8M"));
        assert_eq!(arg_after(&args, "-r"), Some("25"));
        assert_eq!(arg_after(&args, "-pix_fmt"), Some("yuv420p"));
        assert_eq!(arg_after(&args, "-t"), Some("15"));
        assert_eq!(arg_after(&args, "-movflags"), Some("+faststart"));
        assert!(arg_after(&args, "-vf").unwrap().contains("pad=w=1920:h=1296"));
        assert!(args.iter().any(|a| a == "-an"));
        assert!(!args.iter().any(|a| a == "aac"));
        assert_eq!(args.last().map(String::as_str), Some("/out/video.mp4"));
    }

    #[test]
    fn test_mux_command_with_audio() {
        let enc = encoder();
        let plan = MuxPlan {
            frames_dir: Path::new("/scratch"),
            per_image_seconds: 2.5,
            total_duration_secs: 7.5,
            canvas: (800, 540),
            audio: Some(Path::new("/scratch/processed_audio.mp3")),
            encoder: &enc,
            output_fps: 25,
            audio_bitrate: "192k",
            output_path: Path::new("out.mp4"),
        };
        let args = command_args(&build_mux_command(Path::new("ffmpeg"), &plan));

        assert_eq!(arg_after(&args, "-framerate"), Some("1/2.5"));
        assert_eq!(arg_after(&args, "-t"), Some("7.5"));
        assert_eq!(arg_after(&args, "-c:a"), Some("aac"));
        assert_eq!(arg_after(&args, "-b:a"), Some("192k"));
        assert!(args.windows(2).any(|w| w[0] == "-i" && w[1] == "/scratch/processed_audio.mp3"));
        assert!(args.windows(2).any(|w| w[0] == "-map" && w[1] == "1:a:0"));
        assert!(!args.iter().any(|a| a == "-an"));
    }

    #[test]
    fn test_mux_command_keeps_tiny_durations_nonzero() {
        let enc = encoder();
        let plan = MuxPlan {
            frames_dir: Path::new("/scratch"),
            per_image_seconds: 1e-7,
            total_duration_secs: 3e-7,
            canvas: (640, 432),
            audio: None,
            encoder: &enc,
            output_fps: 25,
            audio_bitrate: "192k",
            output_path: Path::new("out.mp4"),
        };
        let args = command_args(&build_mux_command(Path::new("ffmpeg"), &plan));

        assert_eq!(arg_after(&args, "-framerate"), Some("1/0.0000001"));
        assert_eq!(arg_after(&args, "-t"), Some("0.0000003"));
    }

    #[cfg(unix)]
    #[test]
    fn test_mux_command_passes_non_utf8_paths_through() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let frames_dir = Path::new(OsStr::from_bytes(b"/scratch/caf\xe9"));
        let output = Path::new(OsStr::from_bytes(b"/out/f\xfcr.mp4"));
        let enc = encoder();
        let plan = MuxPlan {
            frames_dir,
            per_image_seconds: 5.0,
            total_duration_secs: 5.0,
            canvas: (640, 432),
            audio: None,
            encoder: &enc,
            output_fps: 25,
            audio_bitrate: "192k",
            output_path: output,
        };
        let cmd = build_mux_command(Path::new("ffmpeg"), &plan);
        let args: Vec<&OsStr> = cmd.get_args().collect();

        let pattern = frames_dir.join(FRAME_PATTERN);
        assert!(args.contains(&pattern.as_os_str()));
        assert_eq!(args.last(), Some(&output.as_os_str()));
    }

    #[test]
    fn test_pipeline_state_names() {
        assert_eq!(PipelineState::Muxing.as_str(), "muxing");
        assert_eq!(PipelineState::Failed.as_str(), "failed");
    }
}
