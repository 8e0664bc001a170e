use std::sync::LazyLock;

use regex::Regex;

/// `<name> <value> <range>` anchored from the right: the last two
/// whitespace-delimited tokens are value and range, the rest is the name.
static MEASUREMENT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<test>.+?)\s+(?P<value>\S+)\s+(?P<range>\S+)$").unwrap()
});

/// Fields of one measurement row, borrowed from the source line.
///
/// Value and range are literal text (units included); nothing is parsed
/// as a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementFields<'a> {
    pub test: &'a str,
    pub value: &'a str,
    pub reference_range: &'a str,
}

/// Split a line into test name, value and reference range.
///
/// Returns `None` for lines with fewer than three tokens or whose name part
/// carries no letter (e.g. page numbers, bare numeric rows).
pub fn extract_measurement(line: &str) -> Option<MeasurementFields<'_>> {
    let caps = MEASUREMENT_LINE.captures(line.trim())?;

    let test = caps.name("test")?.as_str().trim();
    if test.is_empty() || !test.chars().any(char::is_alphabetic) {
        return None;
    }

    Some(MeasurementFields {
        test,
        value: caps.name("value")?.as_str(),
        reference_range: caps.name("range")?.as_str(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_simple_row() {
        let fields = extract_measurement("Hemoglobin  13.5  12.0-15.5").unwrap();
        assert_eq!(fields.test, "Hemoglobin");
        assert_eq!(fields.value, "13.5");
        assert_eq!(fields.reference_range, "12.0-15.5");
    }

    #[test]
    fn multi_word_names_keep_internal_spacing() {
        let fields = extract_measurement("Total Leucocyte  Count\t7500\t4000-11000").unwrap();
        assert_eq!(fields.test, "Total Leucocyte  Count");
        assert_eq!(fields.value, "7500");
        assert_eq!(fields.reference_range, "4000-11000");
    }

    #[test]
    fn keeps_units_and_slashes_verbatim() {
        let fields = extract_measurement("   Platelet Count 2.5 1.5/4.5   ").unwrap();
        assert_eq!(fields.test, "Platelet Count");
        assert_eq!(fields.value, "2.5");
        assert_eq!(fields.reference_range, "1.5/4.5");

        let fields = extract_measurement("Urine Colour Pale_Yellow Pale-Yellow").unwrap();
        assert_eq!(fields.value, "Pale_Yellow");
    }

    #[test]
    fn fewer_than_three_tokens_is_no_match() {
        assert!(extract_measurement("Hemoglobin 13.5").is_none());
        assert!(extract_measurement("Hemoglobin").is_none());
        assert!(extract_measurement("").is_none());
        assert!(extract_measurement("   \t ").is_none());
    }

    #[test]
    fn name_without_letters_is_no_match() {
        assert!(extract_measurement("1 2 3").is_none());
        assert!(extract_measurement("-- 5 1-10").is_none());
    }

    #[test]
    fn name_with_digits_and_letters_matches() {
        let fields = extract_measurement("Vitamin B12 450 200-900").unwrap();
        assert_eq!(fields.test, "Vitamin B12");
        assert_eq!(fields.value, "450");
    }
}
