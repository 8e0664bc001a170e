use super::measurement::{extract_measurement, MeasurementFields};

/// Syntactic role of one line inside the measurement section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Category sub-heading, trimmed.
    Heading(&'a str),
    Measurement(MeasurementFields<'a>),
    Noise,
}

/// Classify a single line. Stateless: category tracking lives in the assembler.
///
/// Heading wins over measurement, so an all-caps three-word heading such as
/// `COMPLETE BLOOD COUNT` is never read as a data row.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Noise;
    }
    if is_heading(trimmed) {
        return LineKind::Heading(trimmed);
    }
    match extract_measurement(trimmed) {
        Some(fields) => LineKind::Measurement(fields),
        None => LineKind::Noise,
    }
}

/// Uppercase letters and spaces only, with `_` accepted as a word joiner.
/// Digits and other punctuation disqualify the line.
fn is_heading(trimmed: &str) -> bool {
    trimmed.chars().any(char::is_alphabetic)
        && trimmed
            .chars()
            .all(|c| c.is_uppercase() || c == ' ' || c == '\t' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercase_lines_are_headings() {
        assert_eq!(classify_line("HAEMATOLOGY"), LineKind::Heading("HAEMATOLOGY"));
        assert_eq!(
            classify_line("  COMPLETE BLOOD COUNT  "),
            LineKind::Heading("COMPLETE BLOOD COUNT")
        );
        assert_eq!(classify_line("LIPID_PROFILE"), LineKind::Heading("LIPID_PROFILE"));
    }

    #[test]
    fn digits_or_punctuation_break_headings() {
        assert!(!matches!(classify_line("VITAMIN B12"), LineKind::Heading(_)));
        assert!(!matches!(classify_line("PAGE 1 OF 2"), LineKind::Heading(_)));
        assert!(!matches!(classify_line("NOTE:"), LineKind::Heading(_)));
        assert!(!matches!(classify_line("Liver Function"), LineKind::Heading(_)));
    }

    #[test]
    fn data_rows_are_measurements() {
        match classify_line("Hemoglobin  13.5  12.0-15.5") {
            LineKind::Measurement(fields) => {
                assert_eq!(fields.test, "Hemoglobin");
                assert_eq!(fields.value, "13.5");
                assert_eq!(fields.reference_range, "12.0-15.5");
            }
            other => panic!("expected measurement, got {other:?}"),
        }
    }

    #[test]
    fn any_three_token_line_with_lettered_name_is_measurement() {
        for line in ["a b c", "Sodium 140 mmol/L", "Mixed Case Name x y", "ESR (1 hr) 10 0-20"] {
            assert!(
                matches!(classify_line(line), LineKind::Measurement(_)),
                "{line} should classify as a measurement"
            );
        }
    }

    #[test]
    fn blank_and_short_lines_are_noise() {
        assert_eq!(classify_line(""), LineKind::Noise);
        assert_eq!(classify_line("    "), LineKind::Noise);
        assert_eq!(classify_line("Page 1"), LineKind::Noise);
        assert_eq!(classify_line("12 34 56"), LineKind::Noise);
        assert_eq!(classify_line("---"), LineKind::Noise);
    }
}
