// ============================================================================
// picvideo-cli/src/logging.rs
// ============================================================================
//
// LOGGING: fern dispatch for the picvideo binary
//
// Everything the core logs through the `log` facade, including the run lines
// of its LogFacadeSink, ends up here. The console only shows warnings and
// errors unless `--verbose` is given, since the progress bar already covers
// routine progress. The optional run log file always receives debug detail.

use crate::config::LOG_FILE_PREFIX;
use crate::error::{CliErrorContext, CliResult};

use log::LevelFilter;
use picvideo_core::CoreError;

use std::fs;
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let log_filename = format!("picvideo_run_{}.log", picvideo_cli::logging::get_timestamp());
/// assert!(log_filename.ends_with(".log"));
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Path of the run log inside `log_dir`.
pub fn run_log_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("{}{}.log", LOG_FILE_PREFIX, get_timestamp()))
}

fn console_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Installs the global logger.
///
/// # Arguments
///
/// * `verbose` - Show info and debug records on the console
/// * `log_dir` - When set, also write every record to a timestamped file there
///
/// # Returns
///
/// The path of the run log file, if one was opened.
pub fn init_logging(verbose: bool, log_dir: Option<&Path>) -> CliResult<Option<PathBuf>> {
    let console = fern::Dispatch::new()
        .level(console_level(verbose))
        .format(|out, message, record| match record.level() {
            log::Level::Error | log::Level::Warn => {
                out.finish(format_args!("{}: {}", record.level(), message))
            }
            _ => out.finish(format_args!("{}", message)),
        })
        .chain(std::io::stderr());

    let mut dispatch = fern::Dispatch::new()
        .level(LevelFilter::Debug)
        .level_for("ffmpeg_sidecar", LevelFilter::Warn)
        .chain(console);

    let mut log_path = None;
    if let Some(dir) = log_dir {
        fs::create_dir_all(dir)
            .cli_with_context(|| format!("Failed to create log directory '{}'", dir.display()))?;
        let path = run_log_path(dir);
        let file = fern::log_file(&path)
            .cli_with_context(|| format!("Failed to open log file '{}'", path.display()))?;

        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "[{} {:<5} {}] {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                        record.level(),
                        record.target(),
                        message
                    ))
                })
                .chain(file),
        );
        log_path = Some(path);
    }

    dispatch
        .apply()
        .map_err(|e| CoreError::OperationFailed(format!("Failed to initialise logging: {}", e)))?;

    Ok(log_path)
}
