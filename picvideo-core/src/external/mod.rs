// ============================================================================
// picvideo-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with ffmpeg, ffprobe and exiftool
//
// This module encapsulates every call the pipeline makes to an external
// command-line tool. Short bounded calls (probes, per-frame composition, audio
// conditioning) go through the `ToolRunner` trait; the long-running mux goes
// through the `FfmpegSpawner` trait. Both seams can be replaced by the mocks
// in `mocks` for tests.
//
// KEY COMPONENTS:
// - ToolPaths: resolved locations of the three binaries
// - Toolchain: runner + resolved paths + configuration, passed to processing code
// - check_dependency: verifies a tool can be started
//
// TOOL RESOLUTION ORDER:
// 1. explicit path from CoreConfig
// 2. first match on PATH
// 3. the configured tools directory
// 4. the bare tool name (left for the OS to resolve, fails at spawn time)

// ---- Internal crate imports ----
use crate::config::CoreConfig;
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Bounded execution of short-lived tool processes
pub mod command;

/// exiftool metadata extraction
pub mod exiftool;

/// Traits and implementations for the long-running mux process
pub mod ffmpeg_executor;

/// ffprobe dimension and duration probes
pub mod ffprobe_executor;

/// Scripted stand-ins for the tool seams
#[cfg(any(test, feature = "test-mocks"))]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use command::{SystemToolRunner, ToolInvocation, ToolOutput, ToolRunner};
pub use exiftool::{ImageMetadata, extract_metadata};
pub use ffmpeg_executor::{FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner};
pub use ffprobe_executor::{probe_duration, probe_image_dimensions};

pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";
pub const EXIFTOOL: &str = "exiftool";

// ============================================================================
// TOOL RESOLUTION
// ============================================================================

/// Resolved locations of the external binaries used by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub exiftool: PathBuf,
}

impl ToolPaths {
    /// Resolves all three tools against the configuration and `PATH`.
    pub fn resolve(config: &CoreConfig) -> Self {
        let tools_dir = config.tools_dir.as_deref();
        Self {
            ffmpeg: resolve_tool(FFMPEG, config.ffmpeg_path.as_deref(), tools_dir),
            ffprobe: resolve_tool(FFPROBE, config.ffprobe_path.as_deref(), tools_dir),
            exiftool: resolve_tool(EXIFTOOL, config.exiftool_path.as_deref(), tools_dir),
        }
    }
}

/// Resolves a single tool location.
///
/// # Arguments
///
/// * `name` - Bare tool name, e.g. "ffprobe"
/// * `explicit` - Path configured by the caller, always wins when set
/// * `tools_dir` - Directory consulted when the tool is not on `PATH`
///
/// # Returns
///
/// * The path to invoke. Falls back to the bare name when nothing matched,
///   so a missing tool surfaces as a spawn error at call time.
pub fn resolve_tool(name: &str, explicit: Option<&Path>, tools_dir: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if let Some(found) = env::var_os("PATH").and_then(|paths| {
        env::split_paths(&paths).find_map(|dir| executable_in(&dir, name))
    }) {
        return found;
    }

    if let Some(found) = tools_dir.and_then(|dir| executable_in(dir, name)) {
        log::debug!("Using {} from tools directory: {}", name, found.display());
        return found;
    }

    PathBuf::from(name)
}

fn executable_in(dir: &Path, name: &str) -> Option<PathBuf> {
    let candidate = dir.join(format!("{}{}", name, env::consts::EXE_SUFFIX));
    if candidate.is_file() {
        return Some(candidate);
    }
    // exiftool is commonly installed as a perl script without suffix.
    let bare = dir.join(name);
    bare.is_file().then_some(bare)
}

// ============================================================================
// TOOLCHAIN
// ============================================================================

/// Everything processing code needs to call an external tool.
#[derive(Debug, Clone)]
pub struct Toolchain<R: ToolRunner> {
    runner: R,
    paths: ToolPaths,
    config: CoreConfig,
}

impl<R: ToolRunner> Toolchain<R> {
    /// Builds a toolchain, resolving tool paths from the configuration.
    pub fn new(runner: R, config: CoreConfig) -> Self {
        let paths = ToolPaths::resolve(&config);
        Self::with_paths(runner, paths, config)
    }

    pub fn with_paths(runner: R, paths: ToolPaths, config: CoreConfig) -> Self {
        Self {
            runner,
            paths,
            config,
        }
    }

    pub fn paths(&self) -> &ToolPaths {
        &self.paths
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn run(&self, invocation: &ToolInvocation) -> CoreResult<ToolOutput> {
        self.runner.run(invocation)
    }
}

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs the command with `version_arg` (`-version` for ffmpeg/ffprobe, `-ver`
/// for exiftool) and discards its output. Only a failure to start counts as
/// missing; the exit status is not inspected.
///
/// # Returns
///
/// * `Ok(())` - If the command could be started
/// * `Err(CoreError::DependencyNotFound)` - If the command is not found
/// * `Err(CoreError::CommandStart)` - If the command exists but fails to start
pub fn check_dependency(program: &Path, version_arg: &str) -> CoreResult<()> {
    let result = Command::new(program)
        .arg(version_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", program.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", program.display());
            Err(CoreError::DependencyNotFound(program.display().to_string()))
        }
        Err(e) => {
            log::error!(
                "Failed to start dependency check command '{}': {}",
                program.display(),
                e
            );
            Err(CoreError::CommandStart(program.display().to_string(), e))
        }
    }
}

/// Availability of each tool, as reported by [`check_tools`].
#[derive(Debug)]
pub struct ToolReport {
    pub name: &'static str,
    pub path: PathBuf,
    pub status: CoreResult<()>,
}

/// Checks all three tools, returning one report per tool.
pub fn check_tools(paths: &ToolPaths) -> Vec<ToolReport> {
    [
        (FFMPEG, &paths.ffmpeg, "-version"),
        (FFPROBE, &paths.ffprobe, "-version"),
        (EXIFTOOL, &paths.exiftool, "-ver"),
    ]
    .into_iter()
    .map(|(name, path, arg)| ToolReport {
        name,
        path: path.clone(),
        status: check_dependency(path, arg),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_explicit_path_wins() {
        let path = resolve_tool(
            "ffmpeg",
            Some(Path::new("/opt/custom/ffmpeg")),
            Some(Path::new("/nowhere")),
        );
        assert_eq!(path, PathBuf::from("/opt/custom/ffmpeg"));
    }

    #[test]
    fn test_tools_dir_used_when_not_on_path() {
        let dir = tempdir().unwrap();
        let name = "picvideo-test-tool-xyz";
        let tool = dir.path().join(format!("{}{}", name, env::consts::EXE_SUFFIX));
        fs::write(&tool, b"").unwrap();

        let path = resolve_tool(name, None, Some(dir.path()));
        assert_eq!(path, tool);
    }

    #[test]
    fn test_unresolved_tool_falls_back_to_bare_name() {
        let path = resolve_tool("picvideo-missing-tool-xyz", None, None);
        assert_eq!(path, PathBuf::from("picvideo-missing-tool-xyz"));
    }

    #[test]
    fn test_missing_dependency_reported() {
        let err = check_dependency(Path::new("picvideo-missing-tool-xyz"), "-version").unwrap_err();
        assert!(matches!(err, CoreError::DependencyNotFound(_)));
    }

    #[test]
    fn test_resolve_uses_config_paths() {
        let config = CoreConfig {
            ffprobe_path: Some(PathBuf::from("/x/ffprobe")),
            ..CoreConfig::default()
        };
        let paths = ToolPaths::resolve(&config);
        assert_eq!(paths.ffprobe, PathBuf::from("/x/ffprobe"));
    }
}
