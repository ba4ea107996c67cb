// ============================================================================
// picvideo-core/src/external/exiftool.rs
// ============================================================================
//
// METADATA EXTRACTION: Camera settings via exiftool
//
// Pulls camera make, ISO, shutter speed and aperture out of an image for the
// auto-generated caption. Extraction never fails: a missing tool, a timeout or
// unparsable output all degrade to "N/A" fields.

use crate::external::{ToolInvocation, ToolRunner, Toolchain};
use std::path::Path;

/// Placeholder for a field that could not be read.
pub const NOT_AVAILABLE: &str = "N/A";

/// Tags requested from exiftool, in output order.
const TAGS: [&str; 4] = ["-make", "-ISO", "-ShutterSpeed", "-FNumber"];

/// Camera settings of one image. Every field is either a value or `"N/A"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMetadata {
    pub make: String,
    pub iso: String,
    pub shutter: String,
    pub fnumber: String,
}

impl Default for ImageMetadata {
    fn default() -> Self {
        Self {
            make: NOT_AVAILABLE.to_string(),
            iso: NOT_AVAILABLE.to_string(),
            shutter: NOT_AVAILABLE.to_string(),
            fnumber: NOT_AVAILABLE.to_string(),
        }
    }
}

impl ImageMetadata {
    /// True when ISO, shutter speed and aperture are all known.
    pub fn has_exposure(&self) -> bool {
        [&self.iso, &self.shutter, &self.fnumber]
            .iter()
            .all(|v| v.as_str() != NOT_AVAILABLE)
    }
}

/// Runs exiftool on `image_path` and parses its output.
///
/// `-f` forces a `-` placeholder for missing tags so the four output lines
/// always arrive in the requested order.
pub fn extract_metadata<R: ToolRunner>(tools: &Toolchain<R>, image_path: &Path) -> ImageMetadata {
    let invocation = ToolInvocation::new("exiftool", &tools.paths().exiftool)
        .args(TAGS)
        .args(["-f", "-fast"])
        .arg(image_path)
        .timeout(tools.config().probe_timeout);

    match tools.run(&invocation) {
        Ok(output) if output.success() => parse_exiftool_output(&output.stdout),
        Ok(output) => {
            log::debug!(
                "exiftool exited with {} for {}: {}",
                output.status,
                image_path.display(),
                output.stderr.trim()
            );
            ImageMetadata::default()
        }
        Err(e) => {
            log::debug!("Metadata extraction failed for {}: {}", image_path.display(), e);
            ImageMetadata::default()
        }
    }
}

/// Parses `Tag Name : value` lines positionally into make, ISO, shutter, f-number.
pub fn parse_exiftool_output(stdout: &str) -> ImageMetadata {
    let mut values = stdout
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(field_value);

    let mut next = || values.next().unwrap_or_else(|| NOT_AVAILABLE.to_string());
    ImageMetadata {
        make: next(),
        iso: next(),
        shutter: next(),
        fnumber: next(),
    }
}

/// Value after the first colon with every space removed, as the captions
/// expect ("NIKON CORPORATION" reads "NIKONCORPORATION").
fn field_value(line: &str) -> String {
    let value: String = line
        .split_once(':')
        .map_or("", |(_, v)| v)
        .chars()
        .filter(|c| *c != ' ')
        .collect();
    let value = value.trim();
    if value.is_empty() || value == "-" {
        NOT_AVAILABLE.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_output() {
        let out = "Make                            : Canon\n\
                   ISO                             : 200\n\
                   Shutter Speed                   : 1/250\n\
                   F Number                        : 5.6\n";
        let meta = parse_exiftool_output(out);
        assert_eq!(meta.make, "Canon");
        assert_eq!(meta.iso, "200");
        assert_eq!(meta.shutter, "1/250");
        assert_eq!(meta.fnumber, "5.6");
        assert!(meta.has_exposure());
    }

    #[test]
    fn test_placeholder_becomes_not_available() {
        let out = "Make : NIKON CORPORATION\nISO : -\nShutter Speed : 1/60\nF Number : 2.8\n";
        let meta = parse_exiftool_output(out);
        assert_eq!(meta.make, "NIKONCORPORATION");
        assert_eq!(meta.iso, NOT_AVAILABLE);
        assert!(!meta.has_exposure());
    }

    #[test]
    fn test_missing_lines_become_not_available() {
        let meta = parse_exiftool_output("Make : Sony\n");
        assert_eq!(meta.make, "Sony");
        assert_eq!(meta.fnumber, NOT_AVAILABLE);
        assert_eq!(parse_exiftool_output(""), ImageMetadata::default());
    }

    #[test]
    fn test_value_with_colon_keeps_remainder() {
        let meta = parse_exiftool_output("Make : Acme: Pro\n");
        assert_eq!(meta.make, "Acme:Pro");
    }

    #[test]
    fn test_inner_spaces_are_removed() {
        let out = "Make : NIKON CORPORATION\nISO : 100\nShutter Speed : 1/ 500\nF Number : 2.8\n";
        let meta = parse_exiftool_output(out);
        assert_eq!(meta.make, "NIKONCORPORATION");
        assert_eq!(meta.shutter, "1/500");
        assert!(meta.has_exposure());
    }
}
