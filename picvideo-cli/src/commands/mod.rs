//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Builds a slideshow video on a worker thread and renders its progress.
pub mod create;

/// Composes one frame for layout inspection.
pub mod preview;

/// Reports tool availability and the encoder a run would use.
pub mod check;

use crate::cli::ToolArgs;
use crate::error::CliResult;

use picvideo_core::{CoreConfig, CoreConfigBuilder};

use std::path::Path;

/// Maps tool arguments onto a validated core configuration.
pub fn core_config(tools: &ToolArgs, temp_dir: Option<&Path>) -> CliResult<CoreConfig> {
    let mut builder = CoreConfigBuilder::new();
    if let Some(path) = &tools.ffmpeg {
        builder = builder.ffmpeg_path(path.clone());
    }
    if let Some(path) = &tools.ffprobe {
        builder = builder.ffprobe_path(path.clone());
    }
    if let Some(path) = &tools.exiftool {
        builder = builder.exiftool_path(path.clone());
    }
    if let Some(dir) = &tools.tools_dir {
        builder = builder.tools_dir(dir.clone());
    }
    if let Some(font) = &tools.font_file {
        builder = builder.font_file(font.clone());
    }
    if let Some(dir) = temp_dir {
        builder = builder.temp_dir(dir.to_path_buf());
    }

    let config = builder.build();
    config.validate()?;
    Ok(config)
}
