//! Core library for turning still images into a slideshow video using ffmpeg,
//! ffprobe and exiftool.
//!
//! This crate provides image discovery, per-image frame composition with
//! metadata captions, background audio conditioning, encoder selection and the
//! orchestration of a complete run, either inline or on a worker thread.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use picvideo_core::{CoreConfig, create_video, find_image_files};
//! use std::path::Path;
//!
//! let config = CoreConfig::default();
//! let images = find_image_files(Path::new("/path/to/photos")).unwrap();
//!
//! let mut report = |update: picvideo_core::ProgressUpdate| {
//!     println!("{} {}/{}", update.phase, update.current, update.total);
//! };
//!
//! let ok = create_video(
//!     &config,
//!     &images,
//!     Path::new("slideshow.mp4"),
//!     7.0,
//!     None,
//!     Some(&mut report),
//! );
//! assert!(ok);
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod job;
pub mod processing;
pub mod progress_reporting;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, CoreConfigBuilder};
pub use discovery::{expand_inputs, find_image_files};
pub use error::{CoreError, CoreResult};
pub use external::{ImageMetadata, ToolPaths, Toolchain, extract_metadata};
pub use job::{CancellationToken, VideoJob};
pub use processing::{
    ComposedFrame, EncoderChoice, FrameSpec, RunSummary, SlideshowAssembler, SlideshowRequest,
    compose_frame, condition_audio, select_encoder,
};
pub use progress_reporting::{LogFacadeSink, LogSink, MemorySink, Phase, ProgressUpdate};
pub use utils::format_duration;

use external::{SidecarSpawner, SystemToolRunner};
use std::path::{Path, PathBuf};

/// Creates a slideshow video and reports only success or failure.
///
/// Runs on the calling thread with the production tools; diagnostics go to
/// the `log` facade. Use [`SlideshowAssembler`] or [`VideoJob`] for the typed
/// result and a custom log sink.
///
/// # Arguments
///
/// * `config` - Tool locations, timeouts and encoding parameters
/// * `image_paths` - Source images in presentation order
/// * `output_path` - Video file to write
/// * `per_image_seconds` - Display time of each frame, must be positive
/// * `audio_path` - Optional background track, looped or cut to fit
/// * `progress` - Optional receiver of progress updates
///
/// # Returns
///
/// `true` when the output was written.
pub fn create_video(
    config: &CoreConfig,
    image_paths: &[PathBuf],
    output_path: &Path,
    per_image_seconds: f64,
    audio_path: Option<&Path>,
    progress: Option<&mut dyn FnMut(ProgressUpdate)>,
) -> bool {
    let request = SlideshowRequest::new(
        image_paths.to_vec(),
        per_image_seconds,
        output_path.to_path_buf(),
    )
    .with_audio(audio_path.map(Path::to_path_buf));

    let assembler = SlideshowAssembler::new(
        Toolchain::new(SystemToolRunner, config.clone()),
        SidecarSpawner,
    );

    let mut ignore = |_: ProgressUpdate| {};
    let progress: &mut dyn FnMut(ProgressUpdate) = match progress {
        Some(callback) => callback,
        None => &mut ignore,
    };

    assembler.run(&request, progress).is_ok()
}
