//! Progress and log reporting for a slideshow run.
//!
//! The pipeline reports two things to its caller:
//! - structured [`ProgressUpdate`]s (images attempted, then an indeterminate
//!   compiling phase), delivered through a callback
//! - human-readable run lines, delivered to an injected [`LogSink`]
//!
//! Neither mechanism touches global state; a caller that wants run lines in
//! its own log simply passes [`LogFacadeSink`].

use std::fmt;
use std::sync::Mutex;

use log::Level;

/// Stage of a run that a progress update refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Per-image composition: `current` images attempted out of `total`
    Processing,
    /// Final mux: coarse advisory values on a 0-100 scale
    Compiling,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Processing => "processing",
            Phase::Compiling => "compiling",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One progress notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub current: u32,
    pub total: u32,
    pub phase: Phase,
}

impl ProgressUpdate {
    pub fn processing(current: u32, total: u32) -> Self {
        Self {
            current,
            total,
            phase: Phase::Processing,
        }
    }

    pub fn compiling(current: u32, total: u32) -> Self {
        Self {
            current,
            total,
            phase: Phase::Compiling,
        }
    }
}

/// Destination for human-readable run lines.
pub trait LogSink: Send + Sync {
    /// Writes one line. Lines carry no trailing newline.
    fn write_line(&self, line: &str);

    /// Writes one line with a severity. Sinks without levels ignore it.
    fn write_record(&self, level: Level, line: &str) {
        let _ = level;
        self.write_line(line);
    }

    fn info(&self, line: &str) {
        self.write_record(Level::Info, line);
    }

    fn warn(&self, line: &str) {
        self.write_record(Level::Warn, line);
    }

    fn error(&self, line: &str) {
        self.write_record(Level::Error, line);
    }
}

/// Forwards run lines to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFacadeSink;

impl LogSink for LogFacadeSink {
    fn write_line(&self, line: &str) {
        log::info!("{}", line);
    }

    fn write_record(&self, level: Level, line: &str) {
        log::log!(level, "{}", line);
    }
}

/// Collects run lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|l| l.clone())
            .unwrap_or_default()
    }

    /// True when any collected line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_names() {
        assert_eq!(Phase::Processing.to_string(), "processing");
        assert_eq!(Phase::Compiling.as_str(), "compiling");
    }

    #[test]
    fn test_memory_sink_collects_leveled_lines() {
        let sink = MemorySink::new();
        sink.info("first");
        sink.error("second");
        assert_eq!(sink.lines(), vec!["first", "second"]);
        assert!(sink.contains("sec"));
    }
}
