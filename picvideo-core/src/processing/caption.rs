//! Caption text for the information band.
//!
//! Captions either come from the caller or are synthesized from camera
//! metadata. Before they reach ffmpeg they are escaped for the two parsing
//! levels of a filter graph: the filter option parser and the graph parser.

use chrono::NaiveDate;

use crate::external::ImageMetadata;

/// Builds `"<make> f/<fnumber> <shutter>s ISO<iso>"`, or `"Processed <date>"`
/// when any exposure field is unknown.
#[must_use]
pub fn synthesize_caption(meta: &ImageMetadata, today: NaiveDate) -> String {
    if meta.has_exposure() {
        format!(
            "{} f/{} {}s ISO{}",
            meta.make, meta.fnumber, meta.shutter, meta.iso
        )
    } else {
        format!("Processed {}", today.format("%Y-%m-%d"))
    }
}

/// Caption supplied by the caller, if it carries any visible text.
#[must_use]
pub fn supplied_caption(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// Replaces control characters (newlines included) with spaces.
#[must_use]
pub fn sanitize_caption(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Escapes caption text for use as an unquoted `drawtext` `text=` value.
///
/// Option level: `\`, `'` and `:` are backslash-escaped. Graph level: the
/// result is escaped again for `\`, `'`, `[`, `]`, `,` and `;`.
#[must_use]
pub fn escape_drawtext(text: &str) -> String {
    let option_level = escape_chars(&sanitize_caption(text), &['\\', '\'', ':']);
    escape_chars(&option_level, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(text: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::exiftool::NOT_AVAILABLE;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    fn meta(iso: &str, shutter: &str, fnumber: &str) -> ImageMetadata {
        ImageMetadata {
            make: "Canon".to_string(),
            iso: iso.to_string(),
            shutter: shutter.to_string(),
            fnumber: fnumber.to_string(),
        }
    }

    #[test]
    fn test_exposure_caption() {
        let caption = synthesize_caption(&meta("200", "1/250", "5.6"), date());
        assert_eq!(caption, "Canon f/5.6 1/250s ISO200");
    }

    #[test]
    fn test_any_unknown_exposure_field_gives_date_caption() {
        for m in [
            meta(NOT_AVAILABLE, "1/250", "5.6"),
            meta("200", NOT_AVAILABLE, "5.6"),
            meta("200", "1/250", NOT_AVAILABLE),
        ] {
            assert_eq!(synthesize_caption(&m, date()), "Processed 2024-03-09");
        }
    }

    #[test]
    fn test_unknown_make_still_uses_exposure() {
        let mut m = meta("100", "1/60", "2.8");
        m.make = NOT_AVAILABLE.to_string();
        assert_eq!(synthesize_caption(&m, date()), "N/A f/2.8 1/60s ISO100");
    }

    #[test]
    fn test_supplied_caption_blank_is_none() {
        assert_eq!(supplied_caption(Some("  ")), None);
        assert_eq!(supplied_caption(None), None);
        assert_eq!(supplied_caption(Some(" Trip ")), Some("Trip"));
    }

    #[test]
    fn test_escape_plain_text_unchanged() {
        assert_eq!(escape_drawtext("Canon f/5.6 1/250s ISO200"), "Canon f/5.6 1/250s ISO200");
    }

    #[test]
    fn test_escape_both_levels() {
        assert_eq!(escape_drawtext("a:b"), r"a\\:b");
        assert_eq!(escape_drawtext("it's"), r"it\\\'s");
        assert_eq!(escape_drawtext("x,y;[z]"), r"x\,y\;\[z\]");
        assert_eq!(escape_drawtext(r"back\slash"), r"back\\\\slash");
    }

    #[test]
    fn test_control_characters_replaced() {
        assert_eq!(escape_drawtext("line1\nline2\t!"), "line1 line2 !");
    }
}
