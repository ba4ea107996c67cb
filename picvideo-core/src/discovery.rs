//! Image discovery for slideshow input.
//!
//! Directories are scanned at the top level only for files with a supported
//! image extension (case-insensitive). Results are sorted by file name so a
//! directory of numbered photos keeps its order.

use crate::error::{CoreError, CoreResult};

use std::path::{Path, PathBuf};

/// File extensions accepted as slideshow images.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "tiff", "jpe"];

/// True when `path` has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// Finds image files in the top level of `input_dir`, sorted by name.
///
/// # Arguments
///
/// * `input_dir` - The directory to search
///
/// # Returns
///
/// * `Ok(Vec<PathBuf>)` - Sorted paths of the discovered images
/// * `Err(CoreError::Io)` - If the directory cannot be read
/// * `Err(CoreError::NoFilesFound)` - If no images are found
///
/// # Examples
///
/// ```rust,no_run
/// use picvideo_core::find_image_files;
/// use std::path::Path;
///
/// match find_image_files(Path::new("/path/to/photos")) {
///     Ok(files) => println!("Found {} images", files.len()),
///     Err(e) => println!("Error finding images: {}", e),
/// }
/// ```
pub fn find_image_files(input_dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let read_dir = std::fs::read_dir(input_dir)?;
    let mut files: Vec<PathBuf> = read_dir
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            (path.is_file() && is_supported_image(&path)).then_some(path)
        })
        .collect();

    if files.is_empty() {
        return Err(CoreError::NoFilesFound);
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Expands a mixed list of files and directories into an ordered image list.
///
/// Files are kept in the given order (whatever their extension, the caller
/// chose them explicitly); each directory is replaced by its sorted images.
/// A directory without images is logged and skipped.
pub fn expand_inputs(inputs: &[PathBuf]) -> CoreResult<Vec<PathBuf>> {
    let mut images = Vec::new();
    for input in inputs {
        if input.is_dir() {
            match find_image_files(input) {
                Ok(found) => images.extend(found),
                Err(CoreError::NoFilesFound) => {
                    log::warn!("No images found in directory {}", input.display());
                }
                Err(e) => return Err(e),
            }
        } else if input.is_file() {
            images.push(input.clone());
        } else {
            return Err(CoreError::PathError(format!(
                "Input path does not exist: {}",
                input.display()
            )));
        }
    }

    if images.is_empty() {
        Err(CoreError::NoFilesFound)
    } else {
        Ok(images)
    }
}
