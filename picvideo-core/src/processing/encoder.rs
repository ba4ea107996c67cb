//! Encoder capability probe.
//!
//! Asks ffmpeg for its codec list once per run and picks the preferred H.264
//! encoder when the build has it, otherwise the fallback name.

use crate::config::CoreConfig;
use crate::external::{ToolInvocation, ToolRunner, Toolchain};

/// Video encoding parameters for the final mux. Fixed for the rest of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderChoice {
    pub codec: String,
    pub pixel_format: String,
    pub bitrate: String,
    /// The preferred encoder was missing or the probe failed
    pub is_fallback: bool,
}

/// Picks the encoder from a codec listing. `None` means the probe failed.
#[must_use]
pub fn choose_encoder(codec_listing: Option<&str>, config: &CoreConfig) -> EncoderChoice {
    let has_preferred = codec_listing.is_some_and(|listing| {
        listing
            .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .any(|word| word == config.preferred_encoder)
    });

    let codec = if has_preferred {
        &config.preferred_encoder
    } else {
        &config.fallback_encoder
    };

    EncoderChoice {
        codec: codec.clone(),
        pixel_format: config.pixel_format.clone(),
        bitrate: config.video_bitrate.clone(),
        is_fallback: !has_preferred,
    }
}

/// Runs `ffmpeg -hide_banner -codecs` and chooses the encoder. Never fails.
pub fn select_encoder<R: ToolRunner>(tools: &Toolchain<R>) -> EncoderChoice {
    let invocation = ToolInvocation::new("ffmpeg (codecs)", &tools.paths().ffmpeg)
        .args(["-hide_banner", "-codecs"])
        .timeout(tools.config().probe_timeout);

    let listing = match tools.run(&invocation).and_then(|o| o.into_checked(&invocation.label)) {
        Ok(output) => Some(output.stdout),
        Err(e) => {
            log::debug!("Encoder probe failed: {}", e);
            None
        }
    };

    let choice = choose_encoder(listing.as_deref(), tools.config());
    log::debug!("Selected encoder: {}", choice.codec);
    choice
}
