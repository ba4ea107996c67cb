//! Scratch directory management.
//!
//! Every run composes its frames and conditioned audio inside one exclusive
//! scratch directory. The directory is a `tempfile::TempDir`, so it is removed
//! when the run drops it, on success, failure and panic alike.

use crate::config::CoreConfig;
use crate::error::CoreResult;
use std::path::{Path, PathBuf};
use tempfile::{Builder as TempFileBuilder, TempDir};

/// Prefix of per-run scratch directories.
pub const SCRATCH_PREFIX: &str = "picvideo_frames_";

/// Input pattern for the mux, matching [`frame_path`].
pub const FRAME_PATTERN: &str = "frame_%04d.png";

/// File name of the conditioned audio track.
pub const CONDITIONED_AUDIO_NAME: &str = "processed_audio.mp3";

/// Creates the scratch directory under `config.temp_dir` or the system temp dir.
pub fn create_scratch_dir(config: &CoreConfig) -> CoreResult<TempDir> {
    let builder = {
        let mut b = TempFileBuilder::new();
        b.prefix(SCRATCH_PREFIX);
        b
    };

    match &config.temp_dir {
        Some(base) => {
            std::fs::create_dir_all(base)?;
            Ok(builder.tempdir_in(base)?)
        }
        None => Ok(builder.tempdir()?),
    }
}

/// Path of the frame with the given zero-based index.
pub fn frame_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("frame_{index:04}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_scratch_dir_created_under_base_and_removed_on_drop() {
        let base = tempdir().unwrap();
        let config = CoreConfig {
            temp_dir: Some(base.path().join("nested")),
            ..CoreConfig::default()
        };

        let scratch = create_scratch_dir(&config).unwrap();
        let path = scratch.path().to_path_buf();
        assert!(path.is_dir());
        assert!(path.starts_with(base.path().join("nested")));
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with(SCRATCH_PREFIX)
        );

        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn test_frame_path_is_zero_padded() {
        let p = frame_path(Path::new("/tmp/x"), 7);
        assert_eq!(p, PathBuf::from("/tmp/x/frame_0007.png"));
    }
}
