// picvideo-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DEFAULT_DURATION_SECS, DEFAULT_MAX_IMAGES, DEFAULT_OUTPUT, DEFAULT_PREVIEW};

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "PicVideo: Photo slideshow generator",
    long_about = "Turns still images into a slideshow video with captions and background audio using ffmpeg, ffprobe and exiftool via picvideo-core."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable detailed logging output
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Creates a slideshow video from images and directories of images
    Create(CreateArgs),
    /// Composes a single captioned frame so the layout can be inspected
    Preview(PreviewArgs),
    /// Verifies that ffmpeg, ffprobe and exiftool can be started
    Check(ToolArgs),
}

/// Locations of the external tools. Shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ToolArgs {
    /// Path to the ffmpeg binary
    #[arg(long, value_name = "PATH", env = "PICVIDEO_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe binary
    #[arg(long, value_name = "PATH", env = "PICVIDEO_FFPROBE")]
    pub ffprobe: Option<PathBuf>,

    /// Path to the exiftool binary
    #[arg(long, value_name = "PATH", env = "PICVIDEO_EXIFTOOL")]
    pub exiftool: Option<PathBuf>,

    /// Directory searched for tools not found on PATH
    #[arg(long, value_name = "DIR", env = "PICVIDEO_TOOLS_DIR")]
    pub tools_dir: Option<PathBuf>,

    /// Font file used for captions (ffmpeg's default font when omitted)
    #[arg(long, value_name = "FONT")]
    pub font_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Image files or directories containing images
    #[arg(required = true, value_name = "INPUTS")]
    pub inputs: Vec<PathBuf>,

    /// Video file to write
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Seconds each image stays on screen
    #[arg(
        short,
        long,
        value_name = "SECONDS",
        default_value_t = DEFAULT_DURATION_SECS,
        allow_negative_numbers = true
    )]
    pub duration: f64,

    /// Background audio, looped or cut to the video length
    #[arg(short, long, value_name = "AUDIO")]
    pub audio: Option<PathBuf>,

    /// Caption drawn under every image (generated from metadata when omitted)
    #[arg(short = 't', long = "text", value_name = "TEXT")]
    pub text: Option<String>,

    /// Maximum number of images; extra images are dropped with a warning
    #[arg(long, value_name = "COUNT", default_value_t = DEFAULT_MAX_IMAGES)]
    pub max_images: usize,

    /// Base directory for scratch frames (defaults to the system temp dir)
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Optional: Directory for a timestamped run log file
    #[arg(short, long, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(flatten)]
    pub tools: ToolArgs,
}

#[derive(Parser, Debug)]
pub struct PreviewArgs {
    /// Image to compose
    #[arg(required = true, value_name = "IMAGE")]
    pub image: PathBuf,

    /// PNG file to write
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_PREVIEW)]
    pub output: PathBuf,

    /// Caption to draw (generated from metadata when omitted)
    #[arg(short = 't', long = "text", value_name = "TEXT")]
    pub text: Option<String>,

    #[command(flatten)]
    pub tools: ToolArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_defaults() {
        let cli = Cli::try_parse_from(["picvideo", "create", "photos"]).unwrap();
        let Commands::Create(args) = cli.command else {
            panic!("expected create");
        };
        assert_eq!(args.inputs, vec![PathBuf::from("photos")]);
        assert_eq!(args.output, PathBuf::from("output.mp4"));
        assert_eq!(args.duration, 7.0);
        assert_eq!(args.max_images, 100);
        assert!(args.audio.is_none());
        assert!(args.text.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_create_all_options() {
        let cli = Cli::try_parse_from([
            "picvideo", "-v", "create", "a.jpg", "dir", "-o", "out.mp4", "-d", "2.5", "-a",
            "song.mp3", "-t", "Summer", "--max-images", "10", "--ffmpeg", "/opt/ffmpeg",
            "--tools-dir", "/opt/tools",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Create(args) = cli.command else {
            panic!("expected create");
        };
        assert_eq!(args.inputs.len(), 2);
        assert_eq!(args.duration, 2.5);
        assert_eq!(args.audio, Some(PathBuf::from("song.mp3")));
        assert_eq!(args.text.as_deref(), Some("Summer"));
        assert_eq!(args.max_images, 10);
        assert_eq!(args.tools.ffmpeg, Some(PathBuf::from("/opt/ffmpeg")));
        assert_eq!(args.tools.tools_dir, Some(PathBuf::from("/opt/tools")));
    }

    #[test]
    fn test_create_requires_inputs() {
        assert!(Cli::try_parse_from(["picvideo", "create"]).is_err());
    }

    #[test]
    fn test_preview_defaults() {
        let cli = Cli::try_parse_from(["picvideo", "preview", "img.png"]).unwrap();
        let Commands::Preview(args) = cli.command else {
            panic!("expected preview");
        };
        assert_eq!(args.image, PathBuf::from("img.png"));
        assert_eq!(args.output, PathBuf::from("preview.png"));
    }

    #[test]
    fn test_check_takes_tool_paths() {
        let cli = Cli::try_parse_from(["picvideo", "check", "--exiftool", "/x/exiftool"]).unwrap();
        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.exiftool, Some(PathBuf::from("/x/exiftool")));
    }
}
