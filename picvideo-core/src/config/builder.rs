// ============================================================================
// picvideo-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for CoreConfig
//
// Fluent construction of CoreConfig. Every field has a default, so `build()`
// never fails; call `CoreConfig::validate` on the result before a run.

use std::path::PathBuf;
use std::time::Duration;

use super::CoreConfig;

/// Builder for creating CoreConfig instances.
///
/// # Examples
///
/// ```rust
/// use picvideo_core::config::CoreConfigBuilder;
/// use std::path::PathBuf;
/// use std::time::Duration;
///
/// let config = CoreConfigBuilder::new()
///     .ffmpeg_path(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"))
///     .frame_timeout(Duration::from_secs(60))
///     .output_fps(30)
///     .build();
/// assert_eq!(config.output_fps, 30);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CoreConfigBuilder {
    config: CoreConfig,
}

impl CoreConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ffmpeg_path(mut self, path: PathBuf) -> Self {
        self.config.ffmpeg_path = Some(path);
        self
    }

    pub fn ffprobe_path(mut self, path: PathBuf) -> Self {
        self.config.ffprobe_path = Some(path);
        self
    }

    pub fn exiftool_path(mut self, path: PathBuf) -> Self {
        self.config.exiftool_path = Some(path);
        self
    }

    pub fn tools_dir(mut self, dir: PathBuf) -> Self {
        self.config.tools_dir = Some(dir);
        self
    }

    pub fn temp_dir(mut self, dir: PathBuf) -> Self {
        self.config.temp_dir = Some(dir);
        self
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.config.probe_timeout = timeout;
        self
    }

    pub fn frame_timeout(mut self, timeout: Duration) -> Self {
        self.config.frame_timeout = timeout;
        self
    }

    pub fn audio_timeout(mut self, timeout: Duration) -> Self {
        self.config.audio_timeout = timeout;
        self
    }

    pub fn preferred_encoder(mut self, name: &str) -> Self {
        self.config.preferred_encoder = name.to_string();
        self
    }

    pub fn fallback_encoder(mut self, name: &str) -> Self {
        self.config.fallback_encoder = name.to_string();
        self
    }

    pub fn video_bitrate(mut self, bitrate: &str) -> Self {
        self.config.video_bitrate = bitrate.to_string();
        self
    }

    pub fn audio_bitrate(mut self, bitrate: &str) -> Self {
        self.config.audio_bitrate = bitrate.to_string();
        self
    }

    pub fn output_fps(mut self, fps: u32) -> Self {
        self.config.output_fps = fps;
        self
    }

    pub fn font_file(mut self, path: PathBuf) -> Self {
        self.config.font_file = Some(path);
        self
    }

    pub fn build(self) -> CoreConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_config_defaults() {
        let built = CoreConfigBuilder::new().build();
        let default = CoreConfig::default();
        assert_eq!(built.probe_timeout, default.probe_timeout);
        assert_eq!(built.video_bitrate, default.video_bitrate);
        assert!(built.ffmpeg_path.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let config = CoreConfigBuilder::new()
            .tools_dir(PathBuf::from("thirdparty"))
            .audio_timeout(Duration::from_secs(5))
            .preferred_encoder("libx265")
            .build();
        assert_eq!(config.tools_dir, Some(PathBuf::from("thirdparty")));
        assert_eq!(config.audio_timeout, Duration::from_secs(5));
        assert_eq!(config.preferred_encoder, "libx265");
    }
}
