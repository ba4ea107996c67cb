//! Slideshow processing logic and orchestration.
//!
//! This module organizes the steps of a slideshow run into submodules and
//! exposes the entry points used by the library API and the CLI.

/// Frame layout derived from a source image
pub mod geometry;

/// Caption synthesis and filter-graph escaping
pub mod caption;

/// Per-image frame composition
pub mod frame;

/// Background audio looping and truncation
pub mod audio;

/// Encoder capability probe
pub mod encoder;

/// Run orchestration from images to output video
pub mod slideshow;

pub use audio::{condition_audio, loop_count};
pub use caption::{escape_drawtext, synthesize_caption};
pub use encoder::{EncoderChoice, select_encoder};
pub use frame::{CaptionSource, ComposedFrame, compose_frame};
pub use geometry::FrameSpec;
pub use slideshow::{PipelineState, RunSummary, SlideshowAssembler, SlideshowRequest};
