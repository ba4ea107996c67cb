//! Implementation of the 'check' subcommand.

use crate::cli::ToolArgs;
use crate::commands::core_config;
use crate::error::CliResult;
use crate::terminal;

use picvideo_core::external::{SystemToolRunner, ToolPaths, ToolReport, Toolchain, check_tools};
use picvideo_core::{CoreError, select_encoder};

/// Names of the tools whose check failed.
pub fn missing_tools(reports: &[ToolReport]) -> Vec<&'static str> {
    reports
        .iter()
        .filter(|report| report.status.is_err())
        .map(|report| report.name)
        .collect()
}

/// Runs the 'check' command.
///
/// Fails with `DependencyNotFound` naming every tool that could not be
/// started. The encoder is only probed when all tools are present.
pub fn run_check(args: ToolArgs) -> CliResult<()> {
    let config = core_config(&args, None)?;
    let paths = ToolPaths::resolve(&config);
    let reports = check_tools(&paths);

    terminal::print_section("External Tools");
    for report in &reports {
        match &report.status {
            Ok(()) => terminal::print_status(report.name, &report.path.display().to_string()),
            Err(e) => terminal::print_status(report.name, &format!("unavailable ({})", e)),
        }
    }

    let missing = missing_tools(&reports);
    if !missing.is_empty() {
        return Err(CoreError::DependencyNotFound(missing.join(", ")));
    }

    let encoder = select_encoder(&Toolchain::with_paths(SystemToolRunner, paths, config));
    terminal::print_status(
        "Encoder",
        &format!("{} ({}, {})", encoder.codec, encoder.pixel_format, encoder.bitrate),
    );
    terminal::print_success("All tools available");
    Ok(())
}
