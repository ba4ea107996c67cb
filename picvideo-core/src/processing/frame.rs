// ============================================================================
// picvideo-core/src/processing/frame.rs
// ============================================================================
//
// FRAME COMPOSITION: One source image to one slideshow frame
//
// A frame is the source image fitted into a 16:9 area over a blurred,
// cropped copy of itself, lifted by a soft drop shadow, with a caption band
// underneath. All of it is a single ffmpeg filter graph; this module only
// computes the layout and builds the invocation.
//
// WORKFLOW:
// 1. Probe source dimensions (bounded by the probe timeout)
// 2. Derive the FrameSpec
// 3. Resolve the caption (supplied text, else metadata, else date)
// 4. Run ffmpeg with the filter graph (bounded by the frame timeout)
//
// Any failure removes a partial destination file and is returned to the
// caller, which decides whether to skip the image.

use crate::error::CoreResult;
use crate::external::{ToolInvocation, ToolRunner, Toolchain, extract_metadata, probe_image_dimensions};
use crate::processing::caption::{escape_drawtext, supplied_caption, synthesize_caption};
use crate::processing::geometry::FrameSpec;

use std::fmt::Write as _;
use std::path::Path;

/// Blur applied to the cropped background copy.
const BACKGROUND_BLUR: &str = "boxblur=30:10";

/// Blur applied to the shadow copy of the foreground.
const SHADOW_BLUR: &str = "boxblur=10:10";

/// Shadow margin around the foreground, in pixels.
const SHADOW_MARGIN: u32 = 10;

/// Upward shift of the foreground inside the background area.
const FOREGROUND_LIFT: u32 = 30;

/// Where a frame's caption came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionSource {
    Supplied,
    Metadata,
    /// Exposure metadata was incomplete or unreadable
    Date,
}

/// Result of a successful composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedFrame {
    pub spec: FrameSpec,
    /// Caption text as drawn, before escaping
    pub caption: String,
    pub caption_source: CaptionSource,
}

/// Returns the caption to draw on a frame of `source`.
///
/// Supplied text wins. Otherwise metadata is read with exiftool and turned
/// into an exposure line, or a "Processed <date>" line when incomplete.
pub fn resolve_caption<R: ToolRunner>(
    tools: &Toolchain<R>,
    source: &Path,
    supplied: Option<&str>,
) -> (String, CaptionSource) {
    if let Some(text) = supplied_caption(supplied) {
        return (text.to_string(), CaptionSource::Supplied);
    }

    let meta = extract_metadata(tools, source);
    let origin = if meta.has_exposure() {
        CaptionSource::Metadata
    } else {
        CaptionSource::Date
    };
    (synthesize_caption(&meta, chrono::Local::now().date_naive()), origin)
}

/// Builds the `-filter_complex` graph for one frame.
///
/// `escaped_caption` must already be escaped with [`escape_drawtext`].
#[must_use]
pub fn build_filter_graph(spec: &FrameSpec, escaped_caption: &str, font_file: Option<&Path>) -> String {
    let w = spec.background_width;
    let bh = spec.background_height;
    let th = spec.total_height;
    let m = SHADOW_MARGIN;
    let lift = FOREGROUND_LIFT;

    let mut graph = String::new();
    // Foreground: fit inside the 16:9 area.
    let _ = write!(
        graph,
        "[0:v]scale=w={w}:h={bh}:force_original_aspect_ratio=decrease[fg];"
    );
    // Background: fill the whole canvas, crop, blur.
    let _ = write!(
        graph,
        "[0:v]scale=w={w}:h={th}:force_original_aspect_ratio=increase,crop=w={w}:h={th},{BACKGROUND_BLUR}[bg];"
    );
    let _ = write!(
        graph,
        "[fg]pad=w=iw+{m}*2:h=ih+{m}*2:x={m}:y={m}:color=black@0.05,split[fg_padded][fg_shadow];"
    );
    let _ = write!(graph, "[fg_shadow]{SHADOW_BLUR}[shadow];");
    let _ = write!(
        graph,
        "[bg][shadow]overlay=x=(W-w)/2:y=({th}-h)/2-{lift}[combined];"
    );
    let _ = write!(
        graph,
        "[combined][fg_padded]overlay=x=(W-w)/2:y=({th}-h)/2-{lift}[base];"
    );

    let _ = write!(graph, "[base]drawtext=expansion=none:text={escaped_caption}");
    if let Some(font) = font_file {
        let _ = write!(
            graph,
            ":fontfile={}",
            escape_drawtext(&font.to_string_lossy())
        );
    }
    let _ = write!(
        graph,
        ":fontcolor=white:fontsize={}:x=(w-tw)/2:y={}",
        spec.font_size,
        spec.caption_y()
    );

    graph
}

/// Composes one frame of `source` into `dest`.
///
/// # Arguments
///
/// * `tools` - Toolchain used for the probe, metadata and composition calls
/// * `source` - Source image
/// * `dest` - Output still image, overwritten if present
/// * `caption` - Caller-supplied caption; blank or `None` means auto-caption
///
/// # Returns
///
/// * `Ok(ComposedFrame)` - Layout and caption of the written frame
/// * `Err(_)` - Probe failure, ffmpeg failure or timeout; `dest` does not exist
pub fn compose_frame<R: ToolRunner>(
    tools: &Toolchain<R>,
    source: &Path,
    dest: &Path,
    caption: Option<&str>,
) -> CoreResult<ComposedFrame> {
    let (width, height) = probe_image_dimensions(tools, source)?;
    let spec = FrameSpec::from_source(width, height);
    log::debug!(
        "Frame layout for {}: {}x{} -> {}x{} (font {})",
        source.display(),
        width,
        height,
        spec.background_width,
        spec.total_height,
        spec.font_size
    );

    let (caption, caption_source) = resolve_caption(tools, source, caption);
    let graph = build_filter_graph(
        &spec,
        &escape_drawtext(&caption),
        tools.config().font_file.as_deref(),
    );

    let invocation = ToolInvocation::new("ffmpeg (frame)", &tools.paths().ffmpeg)
        .args(["-y", "-hide_banner", "-loglevel", "error", "-i"])
        .arg(source)
        .arg("-filter_complex")
        .arg(&graph)
        .args(["-frames:v", "1", "-update", "1"])
        .arg(dest)
        .timeout(tools.config().frame_timeout);

    let result = tools
        .run(&invocation)
        .and_then(|output| output.into_checked(&invocation.label));

    if let Err(e) = result {
        remove_partial(dest);
        return Err(e);
    }

    Ok(ComposedFrame {
        spec,
        caption,
        caption_source,
    })
}

fn remove_partial(dest: &Path) {
    if dest.exists() {
        if let Err(e) = std::fs::remove_file(dest) {
            log::warn!("Could not remove partial frame {}: {}", dest.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;
    use crate::error::CoreError;
    use crate::external::mocks::{MockToolResponse, MockToolRunner, mock_toolchain};
    use tempfile::tempdir;

    #[test]
    fn test_filter_graph_for_full_hd() {
        let spec = FrameSpec::from_source(1920, 1080);
        let graph = build_filter_graph(&spec, "Hello", None);
        assert!(graph.starts_with(
            "[0:v]scale=w=1920:h=1080:force_original_aspect_ratio=decrease[fg];"
        ));
        assert!(graph.contains(
            "[0:v]scale=w=1920:h=1296:force_original_aspect_ratio=increase,crop=w=1920:h=1296,boxblur=30:10[bg];"
        ));
        assert!(graph.contains("color=black@0.05,split[fg_padded][fg_shadow];"));
        assert!(graph.contains("[fg_shadow]boxblur=10:10[shadow];"));
        assert!(graph.contains("[bg][shadow]overlay=x=(W-w)/2:y=(1296-h)/2-30[combined];"));
        assert!(graph.contains("[combined][fg_padded]overlay=x=(W-w)/2:y=(1296-h)/2-30[base];"));
        assert!(graph.ends_with(
            "[base]drawtext=expansion=none:text=Hello:fontcolor=white:fontsize=40:x=(w-tw)/2:y=1218"
        ));
        assert!(!graph.contains("fontfile"));
    }

    #[test]
    fn test_filter_graph_with_font_file() {
        let spec = FrameSpec::from_source(800, 600);
        let graph = build_filter_graph(&spec, "x", Some(Path::new("/fonts/a.ttf")));
        assert!(graph.contains(":fontfile=/fonts/a.ttf:fontcolor=white"));
    }

    #[test]
    fn test_compose_frame_with_supplied_caption_skips_metadata() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("frame_0000.png");
        let runner = MockToolRunner::new();
        runner.add_success_expectation("ffprobe", "stream=width,height", "1920,1080\n");
        runner.add_output_expectation("ffmpeg", "-filter_complex");
        let tools = mock_toolchain(runner.clone(), CoreConfig::default());

        let frame = compose_frame(&tools, Path::new("a.jpg"), &dest, Some("Holiday: day 1")).unwrap();
        assert_eq!(frame.caption, "Holiday: day 1");
        assert_eq!(frame.caption_source, CaptionSource::Supplied);
        assert_eq!(frame.spec, FrameSpec::from_source(1920, 1080));
        assert!(dest.exists());
        assert!(runner.calls_to("exiftool").is_empty());

        let ffmpeg = &runner.calls_to("ffmpeg")[0];
        assert_eq!(ffmpeg.timeout, Some(CoreConfig::default().frame_timeout));
        assert!(ffmpeg.arg_after("-filter_complex").unwrap().contains(r"text=Holiday\\: day 1"));
        assert_eq!(ffmpeg.arg_after("-frames:v"), Some("1"));
    }

    #[test]
    fn test_compose_frame_uses_metadata_caption() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out.png");
        let runner = MockToolRunner::new();
        runner.add_success_expectation("ffprobe", "", "4000,3000\n");
        runner.add_success_expectation(
            "exiftool",
            "",
            "Make : Canon\nISO : 400\nShutter Speed : 1/125\nF Number : 4.0\n",
        );
        runner.add_output_expectation("ffmpeg", "");
        let tools = mock_toolchain(runner.clone(), CoreConfig::default());

        let frame = compose_frame(&tools, Path::new("b.jpg"), &dest, None).unwrap();
        assert_eq!(frame.caption, "Canon f/4.0 1/125s ISO400");
        assert_eq!(frame.caption_source, CaptionSource::Metadata);
        let exif = &runner.calls_to("exiftool")[0];
        assert!(exif.has_arg("-f"));
        assert!(exif.has_arg("-fast"));
    }

    #[test]
    fn test_compose_frame_exiftool_failure_falls_back_to_date() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out.png");
        let runner = MockToolRunner::new();
        runner.add_success_expectation("ffprobe", "", "1920,1080");
        runner.add_not_found_expectation("exiftool", "");
        runner.add_output_expectation("ffmpeg", "");
        let tools = mock_toolchain(runner, CoreConfig::default());

        let frame = compose_frame(&tools, Path::new("f.jpg"), &dest, None).unwrap();
        assert_eq!(frame.caption_source, CaptionSource::Date);
        assert!(frame.caption.starts_with("Processed "));
    }

    #[test]
    fn test_caption_baseline_follows_frame_spec() {
        let spec = FrameSpec::from_source(4000, 3000);
        let graph = build_filter_graph(&spec, "x", None);
        assert!(graph.ends_with(&format!(":y={}", spec.caption_y())));
    }

    #[test]
    fn test_compose_frame_probe_failure() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out.png");
        let runner = MockToolRunner::new();
        runner.add_success_expectation("ffprobe", "", "garbage");
        let tools = mock_toolchain(runner.clone(), CoreConfig::default());

        let err = compose_frame(&tools, Path::new("c.jpg"), &dest, Some("t")).unwrap_err();
        assert!(matches!(err, CoreError::FfprobeParse(_)));
        assert!(runner.calls_to("ffmpeg").is_empty());
        assert!(!dest.exists());
    }

    #[test]
    fn test_compose_frame_timeout_removes_partial_output() {
        let dir = tempdir().unwrap();
        let dest = dir.path().join("out.png");
        std::fs::write(&dest, b"partial").unwrap();
        let runner = MockToolRunner::new();
        runner.add_success_expectation("ffprobe", "", "640,480");
        runner.add_expectation("ffmpeg", "", MockToolResponse::Timeout, false);
        let tools = mock_toolchain(runner, CoreConfig::default());

        let err = compose_frame(&tools, Path::new("d.jpg"), &dest, Some("t")).unwrap_err();
        assert!(matches!(err, CoreError::CommandTimeout(..)));
        assert!(!dest.exists());
    }

    #[test]
    fn test_compose_frame_twice_is_identical() {
        let dir = tempdir().unwrap();
        let runner = MockToolRunner::new();
        runner.add_success_expectation("ffprobe", "", "1280,720");
        runner.add_output_expectation("ffmpeg", "");
        let tools = mock_toolchain(runner.clone(), CoreConfig::default());

        let a = compose_frame(&tools, Path::new("e.jpg"), &dir.path().join("1.png"), Some("Same")).unwrap();
        let b = compose_frame(&tools, Path::new("e.jpg"), &dir.path().join("2.png"), Some("Same")).unwrap();
        assert_eq!(a, b);

        let graphs: Vec<_> = runner
            .calls_to("ffmpeg")
            .iter()
            .map(|c| c.arg_after("-filter_complex").unwrap().to_string())
            .collect();
        assert_eq!(graphs[0], graphs[1]);
    }
}
