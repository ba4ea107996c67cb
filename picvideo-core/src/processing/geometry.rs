//! Frame geometry derived from a source image.
//!
//! Every composed frame is as wide as its source. Its upper part is a 16:9
//! background area holding the image; below it sits an information band for
//! the caption, one fifth of the background height.

/// Minimum caption font size in pixels.
pub const MIN_FONT_SIZE: u32 = 40;

/// Canvas layout for one source image. Derived on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpec {
    pub source_width: u32,
    pub source_height: u32,
    /// Always equal to `source_width`
    pub background_width: u32,
    pub background_height: u32,
    pub info_height: u32,
    pub total_height: u32,
    pub font_size: u32,
}

impl FrameSpec {
    /// Computes the layout for a `width` x `height` source.
    #[must_use]
    pub fn from_source(width: u32, height: u32) -> Self {
        let background_height = round_u32(f64::from(width) * 9.0 / 16.0);
        let info_height = round_u32(f64::from(background_height) * 0.2);
        let total_height = background_height + info_height;
        let font_size = MIN_FONT_SIZE.max(round_u32(f64::from(total_height) * 0.025));

        Self {
            source_width: width,
            source_height: height,
            background_width: width,
            background_height,
            info_height,
            total_height,
            font_size,
        }
    }

    /// Baseline y of the caption inside the information band.
    #[must_use]
    pub fn caption_y(&self) -> u32 {
        // Integer halves match the filter expression ffmpeg evaluates.
        (self.background_height + self.info_height / 2 + 50).saturating_sub(self.font_size / 2)
    }
}

fn round_u32(value: f64) -> u32 {
    value.round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_hd_layout() {
        let spec = FrameSpec::from_source(1920, 1080);
        assert_eq!(spec.background_width, 1920);
        assert_eq!(spec.background_height, 1080);
        assert_eq!(spec.info_height, 216);
        assert_eq!(spec.total_height, 1296);
        assert_eq!(spec.font_size, 40);
    }

    #[test]
    fn test_large_source_scales_font() {
        let spec = FrameSpec::from_source(4000, 3000);
        assert_eq!(spec.background_height, 2250);
        assert_eq!(spec.info_height, 450);
        assert_eq!(spec.total_height, 2700);
        assert_eq!(spec.font_size, 68);
    }

    #[test]
    fn test_rounding_of_odd_widths() {
        // 1001 * 9 / 16 = 563.0625, 563 * 0.2 = 112.6
        let spec = FrameSpec::from_source(1001, 700);
        assert_eq!(spec.background_height, 563);
        assert_eq!(spec.info_height, 113);
        assert_eq!(spec.total_height, 676);
    }

    #[test]
    fn test_background_width_tracks_source_and_is_deterministic() {
        for (w, h) in [(1, 1), (640, 480), (1080, 1920), (7952, 5304)] {
            let a = FrameSpec::from_source(w, h);
            let b = FrameSpec::from_source(w, h);
            assert_eq!(a, b);
            assert_eq!(a.background_width, w);
            assert!(a.font_size >= MIN_FONT_SIZE);
            assert_eq!(a.total_height, a.background_height + a.info_height);
        }
    }

    #[test]
    fn test_caption_y() {
        let spec = FrameSpec::from_source(1920, 1080);
        assert_eq!(spec.caption_y(), 1080 + 108 + 50 - 20);
    }
}
