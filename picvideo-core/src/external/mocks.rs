// picvideo-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for unit tests and when the "test-mocks" feature is enabled.

use super::command::{ToolInvocation, ToolOutput, ToolRunner};
use super::ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, command_args};
use super::{ToolPaths, Toolchain};
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult, command_start_error, command_timeout_error};
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::FfmpegEvent;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Builds an `ExitStatus` carrying the given exit code.
pub fn exit_status(code: i32) -> ExitStatus {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }
    #[cfg(windows)]
    {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(code as u32)
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn create_dummy_file(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            log::error!("Mock failed to create parent dir {:?}: {}", parent, e);
        }
    }
    match std::fs::write(path, b"mock output") {
        Ok(()) => log::debug!("Mock created dummy output file: {:?}", path),
        Err(e) => log::error!("Mock failed to create dummy output file {:?}: {}", path, e),
    }
}

// ============================================================================
// TOOL RUNNER MOCK
// ============================================================================

/// Scripted outcome of a tool invocation.
#[derive(Debug, Clone)]
pub enum MockToolResponse {
    /// Exit 0 with the given stdout
    Success(String),
    /// Non-zero exit with the given stderr
    Exit { code: i32, stderr: String },
    /// The invocation's timeout elapses
    Timeout,
    /// The program cannot be started
    NotFound,
}

/// One scripted tool behaviour.
#[derive(Debug, Clone)]
pub struct MockToolExpectation {
    /// Tool name compared against the program's file stem, e.g. "ffprobe"
    pub program: String,
    /// Substring that at least one argument must contain (empty matches all)
    pub arg_pattern: String,
    pub response: MockToolResponse,
    /// Create the last argument as a file on success
    pub create_output: bool,
}

/// A recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockToolCall {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

impl MockToolCall {
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }

    /// Value following `flag`, if present.
    pub fn arg_after(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

/// Mock `ToolRunner` answering from a list of expectations.
///
/// Expectations are matched in insertion order and are not consumed, so one
/// expectation can answer every probe of a run. Register specific patterns
/// before general ones. An invocation matching nothing panics.
#[derive(Debug, Clone, Default)]
pub struct MockToolRunner {
    expectations: Arc<Mutex<Vec<MockToolExpectation>>>,
    received_calls: Arc<Mutex<Vec<MockToolCall>>>,
}

impl MockToolRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_expectation(
        &self,
        program: &str,
        arg_pattern: &str,
        response: MockToolResponse,
        create_output: bool,
    ) {
        lock(&self.expectations).push(MockToolExpectation {
            program: program.to_string(),
            arg_pattern: arg_pattern.to_string(),
            response,
            create_output,
        });
    }

    pub fn add_success_expectation(&self, program: &str, arg_pattern: &str, stdout: &str) {
        self.add_expectation(
            program,
            arg_pattern,
            MockToolResponse::Success(stdout.to_string()),
            false,
        );
    }

    /// Success that also writes the output file (last argument).
    pub fn add_output_expectation(&self, program: &str, arg_pattern: &str) {
        self.add_expectation(
            program,
            arg_pattern,
            MockToolResponse::Success(String::new()),
            true,
        );
    }

    pub fn add_exit_error_expectation(&self, program: &str, arg_pattern: &str, code: i32) {
        self.add_expectation(
            program,
            arg_pattern,
            MockToolResponse::Exit {
                code,
                stderr: format!("mock {} failure", program),
            },
            false,
        );
    }

    pub fn add_timeout_expectation(&self, program: &str, arg_pattern: &str) {
        self.add_expectation(program, arg_pattern, MockToolResponse::Timeout, false);
    }

    pub fn add_not_found_expectation(&self, program: &str, arg_pattern: &str) {
        self.add_expectation(program, arg_pattern, MockToolResponse::NotFound, false);
    }

    pub fn get_received_calls(&self) -> Vec<MockToolCall> {
        lock(&self.received_calls).clone()
    }

    /// Recorded calls whose program is `program`.
    pub fn calls_to(&self, program: &str) -> Vec<MockToolCall> {
        self.get_received_calls()
            .into_iter()
            .filter(|c| c.program == program)
            .collect()
    }
}

fn program_name(program: &Path) -> String {
    program
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl ToolRunner for MockToolRunner {
    fn run(&self, invocation: &ToolInvocation) -> CoreResult<ToolOutput> {
        let program = program_name(&invocation.program);
        let args: Vec<String> = invocation
            .args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        lock(&self.received_calls).push(MockToolCall {
            program: program.clone(),
            args: args.clone(),
            timeout: invocation.timeout,
        });

        let expectation = lock(&self.expectations)
            .iter()
            .find(|exp| {
                exp.program == program
                    && (exp.arg_pattern.is_empty()
                        || args.iter().any(|a| a.contains(&exp.arg_pattern)))
            })
            .cloned();

        let Some(expectation) = expectation else {
            panic!("MockToolRunner: No expectation found for {} {:?}", program, args);
        };

        match expectation.response {
            MockToolResponse::Success(stdout) => {
                if expectation.create_output {
                    if let Some(last) = args.last() {
                        create_dummy_file(&PathBuf::from(last));
                    }
                }
                Ok(ToolOutput {
                    status: exit_status(0),
                    stdout,
                    stderr: String::new(),
                })
            }
            MockToolResponse::Exit { code, stderr } => Ok(ToolOutput {
                status: exit_status(code),
                stdout: String::new(),
                stderr,
            }),
            MockToolResponse::Timeout => Err(command_timeout_error(
                invocation.label.as_str(),
                invocation.timeout.unwrap_or_default(),
            )),
            MockToolResponse::NotFound => Err(command_start_error(
                invocation.label.as_str(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "mock: not found"),
            )),
        }
    }
}

/// Toolchain over `runner` with bare tool names, so expectations match on
/// "ffmpeg", "ffprobe" and "exiftool".
pub fn mock_toolchain(runner: MockToolRunner, config: CoreConfig) -> Toolchain<MockToolRunner> {
    let paths = ToolPaths {
        ffmpeg: PathBuf::from("ffmpeg"),
        ffprobe: PathBuf::from("ffprobe"),
        exiftool: PathBuf::from("exiftool"),
    };
    Toolchain::with_paths(runner, paths, config)
}

// ============================================================================
// FFMPEG SPAWNER MOCK
// ============================================================================

/// Mock implementation of FfmpegProcess.
#[derive(Debug, Clone)]
pub struct MockFfmpegProcess {
    /// Events to emit when handle_events is called.
    pub events_to_emit: Vec<FfmpegEvent>,
    /// Exit status to return when wait is called.
    pub exit_status: ExitStatus,
}

impl FfmpegProcess for MockFfmpegProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        for event in self.events_to_emit.clone() {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        Ok(self.exit_status)
    }
}

/// Represents an expected ffmpeg command call and its mock result.
#[derive(Debug)]
pub struct MockFfmpegExpectation {
    pub arg_pattern: String,
    pub result: CoreResult<MockFfmpegProcess>,
    pub create_dummy_output: bool,
}

/// Mock implementation of FfmpegSpawner supporting multiple expectations.
///
/// Each expectation answers exactly one spawn.
#[derive(Debug, Clone, Default)]
pub struct MockFfmpegSpawner {
    expectations: Arc<Mutex<Vec<MockFfmpegExpectation>>>,
    received_calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockFfmpegSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn add_expectation(
        &self,
        arg_pattern: &str,
        result: CoreResult<MockFfmpegProcess>,
        create_dummy_output: bool,
    ) {
        lock(&self.expectations).push(MockFfmpegExpectation {
            arg_pattern: arg_pattern.to_string(),
            result,
            create_dummy_output,
        });
    }

    pub fn add_success_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        create_dummy_output: bool,
    ) {
        let process = MockFfmpegProcess {
            events_to_emit: events,
            exit_status: exit_status(0),
        };
        self.add_expectation(arg_pattern, Ok(process), create_dummy_output);
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, error: CoreError) {
        self.add_expectation(arg_pattern, Err(error), false);
    }

    pub fn add_exit_error_expectation(
        &self,
        arg_pattern: &str,
        events: Vec<FfmpegEvent>,
        exit_code: i32,
    ) {
        let process = MockFfmpegProcess {
            events_to_emit: events,
            exit_status: exit_status(exit_code),
        };
        self.add_expectation(arg_pattern, Ok(process), false);
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        lock(&self.received_calls).clone()
    }
}

impl FfmpegSpawner for MockFfmpegSpawner {
    type Process = MockFfmpegProcess;

    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        let args = command_args(&cmd);
        lock(&self.received_calls).push(args.clone());

        let mut expectations = lock(&self.expectations);
        let found_index = expectations
            .iter()
            .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)));

        let Some(index) = found_index else {
            panic!("MockFfmpegSpawner: No expectation found for command args: {:?}", args);
        };

        let expectation = expectations.remove(index);
        log::debug!(
            "MockFfmpegSpawner: Matched expectation with pattern '{}'",
            expectation.arg_pattern
        );

        let process = expectation.result?;
        if expectation.create_dummy_output {
            match args.last() {
                Some(output) => create_dummy_file(&PathBuf::from(output)),
                None => log::warn!("MockFfmpegSpawner couldn't find output path in args."),
            }
        }
        Ok(process)
    }
}
