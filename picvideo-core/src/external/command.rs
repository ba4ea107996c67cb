// ============================================================================
// picvideo-core/src/external/command.rs
// ============================================================================
//
// TOOL RUNNER: Bounded execution of short-lived external processes
//
// Probes, frame composition and audio conditioning all run an external tool
// to completion and inspect its output. Each of those calls carries its own
// wall-clock timeout; a child that overruns it is killed and the call fails
// with `CoreError::CommandTimeout`.
//
// KEY COMPONENTS:
// - ToolInvocation: program, arguments, timeout and a label for diagnostics
// - ToolOutput: exit status plus captured stdout/stderr
// - ToolRunner: trait seam so the pipeline can be driven by scripted mocks
// - SystemToolRunner: std::process implementation with a polling timeout

use crate::error::{CoreResult, command_failed_error, command_start_error, command_timeout_error, command_wait_error};

use log::debug;

use std::ffi::{OsStr, OsString};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One external process call.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    /// Short name used in logs and errors, e.g. "ffprobe (dimensions)"
    pub label: String,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub timeout: Option<Duration>,
}

impl ToolInvocation {
    pub fn new(label: impl Into<String>, program: &Path) -> Self {
        Self {
            label: label.into(),
            program: program.to_path_buf(),
            args: Vec::new(),
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Program and arguments joined for logging.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Converts a non-zero exit into `CoreError::CommandFailed`.
    pub fn into_checked(self, label: &str) -> CoreResult<ToolOutput> {
        if self.success() {
            Ok(self)
        } else {
            let detail = if self.stderr.trim().is_empty() {
                self.stdout.trim().to_string()
            } else {
                self.stderr.trim().to_string()
            };
            Err(command_failed_error(label, self.status, detail))
        }
    }
}

/// Runs external tools to completion.
///
/// Implementations must return `CommandTimeout` when the invocation's timeout
/// elapses, and `Ok` with the exit status otherwise (including non-zero exits).
pub trait ToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> CoreResult<ToolOutput>;
}

/// Production runner built on `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemToolRunner;

impl ToolRunner for SystemToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> CoreResult<ToolOutput> {
        debug!("Running {}: {}", invocation.label, invocation.command_line());

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| command_start_error(invocation.label.as_str(), e))?;

        // Drain both pipes on their own threads so a chatty child never
        // blocks on a full pipe while we poll for exit.
        let stdout_handle = child.stdout.take().map(spawn_reader);
        let stderr_handle = child.stderr.take().map(spawn_reader);

        let status = match invocation.timeout {
            Some(timeout) => {
                let start = Instant::now();
                loop {
                    match child.try_wait() {
                        Ok(Some(status)) => break status,
                        Ok(None) if start.elapsed() >= timeout => {
                            let _ = child.kill();
                            let _ = child.wait();
                            join_reader(stdout_handle);
                            join_reader(stderr_handle);
                            return Err(command_timeout_error(invocation.label.as_str(), timeout));
                        }
                        Ok(None) => thread::sleep(POLL_INTERVAL),
                        Err(e) => {
                            let _ = child.kill();
                            return Err(command_wait_error(invocation.label.as_str(), e));
                        }
                    }
                }
            }
            None => child
                .wait()
                .map_err(|e| command_wait_error(invocation.label.as_str(), e))?,
        };

        Ok(ToolOutput {
            status,
            stdout: join_reader(stdout_handle),
            stderr: join_reader(stderr_handle),
        })
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_reader(handle: Option<thread::JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_run_captures_stdout() {
        let inv = ToolInvocation::new("echo", Path::new("echo")).arg("hello");
        let output = SystemToolRunner.run(&inv).unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn test_run_reports_non_zero_exit_without_error() {
        let inv = ToolInvocation::new("sh", Path::new("sh")).args(["-c", "echo oops >&2; exit 3"]);
        let output = SystemToolRunner.run(&inv).unwrap();
        assert!(!output.success());
        assert_eq!(output.stderr.trim(), "oops");
        let err = output.into_checked("sh").unwrap_err();
        assert!(matches!(err, CoreError::CommandFailed(..)));
    }

    #[test]
    fn test_run_times_out_and_kills() {
        let inv = ToolInvocation::new("sleep", Path::new("sleep"))
            .arg("5")
            .timeout(Duration::from_millis(200));
        let start = Instant::now();
        let err = SystemToolRunner.run(&inv).unwrap_err();
        assert!(matches!(err, CoreError::CommandTimeout(..)));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_missing_program_is_start_error() {
        let inv = ToolInvocation::new("missing", Path::new("picvideo-no-such-binary"));
        let err = SystemToolRunner.run(&inv).unwrap_err();
        assert!(matches!(err, CoreError::CommandStart(..)));
    }

    #[test]
    fn test_command_line_joins_args() {
        let inv = ToolInvocation::new("ffprobe", Path::new("ffprobe")).args(["-v", "error"]);
        assert_eq!(inv.command_line(), "ffprobe -v error");
    }
}
