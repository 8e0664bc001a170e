use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

/// Heading that opens the measurement table in the supported report layout.
pub const DEFAULT_SECTION_START: &str = "Test Name";

/// Footer stamped by the PDF generator after the last table row.
pub const DEFAULT_SECTION_END: &str = "Powered by TCPDF";

/// Literal markers bounding the measurement section. Matched case-insensitively,
/// with Unicode case folding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMarkers {
    pub start: String,
    pub end: String,
}

impl Default for SectionMarkers {
    fn default() -> Self {
        Self {
            start: DEFAULT_SECTION_START.to_string(),
            end: DEFAULT_SECTION_END.to_string(),
        }
    }
}

impl SectionMarkers {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

/// Return the lines strictly between the start-marker line and the end marker.
///
/// The line holding the start marker is the table's column header and is
/// skipped whole.
///
/// - No start marker: empty string.
/// - Start marker but no end marker after it: everything after the header line.
pub fn locate_section<'a>(text: &'a str, markers: &SectionMarkers) -> &'a str {
    let Some((_, marker_end)) = find_case_insensitive(text, &markers.start, 0) else {
        return "";
    };
    let body_start = text[marker_end..]
        .find('\n')
        .map_or(text.len(), |nl| marker_end + nl + 1);

    match find_case_insensitive(text, &markers.end, body_start) {
        Some((end, _)) => &text[body_start..end],
        None => &text[body_start..],
    }
}

/// Byte span of the first case-insensitive occurrence of `needle` in
/// `haystack` at or after `from`. Case folding is Unicode-aware.
fn find_case_insensitive(haystack: &str, needle: &str, from: usize) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    let pattern = RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
        .ok()?;

    pattern
        .find_at(haystack, from)
        .map(|m| (m.start(), m.end()))
}
