//! Implementation of the 'preview' subcommand.
//!
//! Composes a single frame exactly as a run would, so layout and caption can
//! be checked without encoding a video.

use crate::cli::PreviewArgs;
use crate::commands::core_config;
use crate::error::{CliErrorContext, CliResult};
use crate::terminal;

use picvideo_core::external::{SystemToolRunner, Toolchain};
use picvideo_core::{ComposedFrame, CoreError, compose_frame, discovery::is_supported_image};

use std::fs;

/// Runs the 'preview' command and returns the composed layout.
pub fn run_preview(args: PreviewArgs) -> CliResult<ComposedFrame> {
    if !args.image.is_file() {
        return Err(CoreError::PathError(format!(
            "Image '{}' does not exist",
            args.image.display()
        )));
    }
    if !is_supported_image(&args.image) {
        terminal::print_warning(&format!(
            "'{}' does not have a supported image extension",
            args.image.display()
        ));
    }

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .cli_with_context(|| format!("Failed to create '{}'", parent.display()))?;
    }

    let config = core_config(&args.tools, None)?;
    let tools = Toolchain::new(SystemToolRunner, config);
    let frame = compose_frame(&tools, &args.image, &args.output, args.text.as_deref())?;

    terminal::print_success(&format!("Preview written to {}", args.output.display()));
    terminal::print_status(
        "Frame size",
        &format!("{}x{}", frame.spec.background_width, frame.spec.total_height),
    );
    terminal::print_status("Font size", &frame.spec.font_size.to_string());
    terminal::print_status("Caption", &frame.caption);
    Ok(frame)
}
