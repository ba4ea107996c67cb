//! Implementation of the 'create' subcommand.
//!
//! Gathers the images, enforces the caller-side limits (image cap, positive
//! duration), then runs the core pipeline on a worker thread while the main
//! thread drains its progress channel into a progress bar.

use crate::cli::CreateArgs;
use crate::commands::core_config;
use crate::error::{CliResult, invalid_input};
use crate::terminal;

use picvideo_core::{
    CancellationToken, LogFacadeSink, RunSummary, SlideshowRequest, VideoJob, expand_inputs,
};

use log::{debug, info, warn};

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Exit code for a run abandoned by a second interrupt.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Turns Ctrl-C presses into cancellation of a running job.
///
/// The first press cancels the job so the pipeline stops at its next
/// checkpoint and removes its scratch directory. A second press asks for an
/// immediate exit.
pub struct InterruptHandler {
    token: CancellationToken,
    presses: AtomicUsize,
}

impl InterruptHandler {
    pub fn new(token: CancellationToken) -> Self {
        Self {
            token,
            presses: AtomicUsize::new(0),
        }
    }

    /// Records one interrupt. Returns true when the process should exit now.
    pub fn on_interrupt(&self) -> bool {
        let previous = self.presses.fetch_add(1, Ordering::SeqCst);
        if previous == 0 {
            warn!("Interrupt received, cancelling run");
            self.token.cancel();
            false
        } else {
            true
        }
    }
}

fn install_interrupt_handler(token: CancellationToken) {
    let handler = InterruptHandler::new(token);
    let result = ctrlc::set_handler(move || {
        if handler.on_interrupt() {
            process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
    if let Err(e) = result {
        warn!("Could not install Ctrl-C handler: {}", e);
    }
}

/// Rejects display durations the pipeline cannot use.
pub fn validate_duration(seconds: f64) -> CliResult<()> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(invalid_input(format!(
            "Duration must be greater than zero (got {})",
            seconds
        )));
    }
    Ok(())
}

/// Expands the inputs into an ordered image list capped at `max_images`.
pub fn collect_images(inputs: &[PathBuf], max_images: usize) -> CliResult<Vec<PathBuf>> {
    if max_images == 0 {
        return Err(invalid_input("--max-images must be at least 1"));
    }

    let mut images = expand_inputs(inputs)?;
    if images.len() > max_images {
        warn!(
            "Found {} images; only the first {} will be used",
            images.len(),
            max_images
        );
        terminal::print_warning(&format!(
            "Using the first {} of {} images",
            max_images,
            images.len()
        ));
        images.truncate(max_images);
    }
    Ok(images)
}

/// Runs the 'create' command and returns the run summary on success.
pub fn run_create(args: CreateArgs) -> CliResult<RunSummary> {
    let started = Instant::now();

    validate_duration(args.duration)?;
    let images = collect_images(&args.inputs, args.max_images)?;
    let config = core_config(&args.tools, args.temp_dir.as_deref())?;

    terminal::print_section("PicVideo");
    terminal::print_status("Images", &images.len().to_string());
    terminal::print_status("Per image", &format!("{}s", args.duration));
    terminal::print_status("Output", &args.output.display().to_string());
    if let Some(audio) = &args.audio {
        terminal::print_status("Audio", &audio.display().to_string());
    }
    if let Some(text) = &args.text {
        terminal::print_status("Caption", text);
    }
    debug!("Core configuration: {:?}", config);

    let request = SlideshowRequest::new(images, args.duration, args.output.clone())
        .with_audio(args.audio.clone())
        .with_caption(args.text.clone());
    let total = request.images.len() as u64;

    info!("Starting slideshow run for {} images", total);
    let job = VideoJob::spawn(config, request, Arc::new(LogFacadeSink))?;
    install_interrupt_handler(job.cancellation_token());

    let mut bar = terminal::RunProgressBar::new(total);
    for update in job.progress() {
        bar.update(&update);
    }
    bar.finish();

    let summary = job.join()?;
    terminal::print_run_summary(&summary, started.elapsed());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_duration_must_be_positive() {
        assert!(validate_duration(7.0).is_ok());
        assert!(validate_duration(0.25).is_ok());
        assert!(validate_duration(0.0).is_err());
        assert!(validate_duration(-3.0).is_err());
        assert!(validate_duration(f64::NAN).is_err());
        assert!(validate_duration(f64::INFINITY).is_err());
    }

    #[test]
    fn test_collect_images_caps_count_in_order() {
        let dir = tempdir().unwrap();
        for name in ["d.jpg", "a.png", "c.jpeg", "b.bmp", "notes.txt"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let images = collect_images(&[dir.path().to_path_buf()], 3).unwrap();
        let names: Vec<String> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.png", "b.bmp", "c.jpeg"]);
    }

    #[test]
    fn test_collect_images_rejects_zero_cap() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        assert!(collect_images(&[dir.path().to_path_buf()], 0).is_err());
    }

    #[test]
    fn test_first_interrupt_cancels_without_exiting() {
        let token = CancellationToken::new();
        let handler = InterruptHandler::new(token.clone());

        assert!(!handler.on_interrupt());
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_second_interrupt_requests_exit() {
        let token = CancellationToken::new();
        let handler = InterruptHandler::new(token.clone());

        handler.on_interrupt();
        assert!(handler.on_interrupt());
        assert!(handler.on_interrupt());
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_collect_images_without_images_fails() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("readme.md"), b"x").unwrap();
        assert!(collect_images(&[dir.path().to_path_buf()], 100).is_err());
    }
}
