// ============================================================================
// picvideo-cli/src/terminal.rs
// ============================================================================
//
// TERMINAL OUTPUT: progress bar and styled status lines
//
// Status lines go to stdout, styled with `console`. The progress bar draws on
// stderr through `indicatif` and hides itself when stderr is not a terminal.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use picvideo_core::{Phase, ProgressUpdate, RunSummary, format_duration};

use std::time::Duration;

/// Styling constants for terminal output
pub mod styling {
    pub const SUCCESS_SYMBOL: &str = "✓";
    pub const WARNING_SYMBOL: &str = "!";
    pub const ERROR_SYMBOL: &str = "✗";

    pub const SECTION_PREFIX: &str = "===== ";
    pub const SECTION_SUFFIX: &str = " =====";

    pub const STATUS_INDENT: &str = "  ";

    pub const BAR_TEMPLATE: &str =
        "{spinner:.green} {msg:<18} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed})";
    pub const PROGRESS_CHARS: &str = "█▓▒░ ";
}

pub fn print_section(title: &str) {
    println!();
    println!(
        "{}",
        style(format!("{}{}{}", styling::SECTION_PREFIX, title, styling::SECTION_SUFFIX)).bold()
    );
}

/// Prints an aligned "label: value" status line.
pub fn print_status(label: &str, value: &str) {
    println!(
        "{}{} {}",
        styling::STATUS_INDENT,
        style(format!("{:<14}", format!("{}:", label))).bold(),
        value
    );
}

pub fn print_success(message: &str) {
    println!("{} {}", style(styling::SUCCESS_SYMBOL).green().bold(), message);
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", style(styling::WARNING_SYMBOL).yellow().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!(
        "{} {} {}",
        style(styling::ERROR_SYMBOL).red().bold(),
        style("Error:").red().bold(),
        message
    );
}

/// Label shown next to the bar for a phase.
fn phase_message(phase: Phase) -> &'static str {
    match phase {
        Phase::Processing => "Processing images",
        Phase::Compiling => "Compiling video",
    }
}

/// Renders run progress as a single bar that is reused across phases.
///
/// The processing phase counts images; the compiling phase is the coarse,
/// advisory 0 to 100 scale reported during the mux.
pub struct RunProgressBar {
    bar: ProgressBar,
    phase: Option<Phase>,
}

impl RunProgressBar {
    pub fn new(total_images: u64) -> Self {
        let bar = ProgressBar::new(total_images);
        if let Ok(bar_style) = ProgressStyle::default_bar().template(styling::BAR_TEMPLATE) {
            bar.set_style(bar_style.progress_chars(styling::PROGRESS_CHARS));
        }
        bar.set_message(phase_message(Phase::Processing));
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar, phase: None }
    }

    pub fn update(&mut self, update: &ProgressUpdate) {
        if self.phase != Some(update.phase) {
            self.phase = Some(update.phase);
            self.bar.set_message(phase_message(update.phase));
            self.bar.set_position(0);
        }
        self.bar.set_length(u64::from(update.total));
        self.bar.set_position(u64::from(update.current.min(update.total)));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Prints the completion summary of a successful run.
pub fn print_run_summary(summary: &RunSummary, elapsed: Duration) {
    print_section("Slideshow Complete");
    print_status("Output", &summary.output_path.display().to_string());
    print_status(
        "Frames",
        &format!(
            "{} composed, {} skipped",
            summary.frames_composed, summary.frames_skipped
        ),
    );
    print_status("Video length", &format_duration(summary.total_duration_secs));
    print_status(
        "Audio",
        if summary.audio_included { "included" } else { "none" },
    );
    print_status("Encoder", &summary.encoder.codec);
    print_status("Elapsed", &format_duration(elapsed.as_secs_f64()));
}
