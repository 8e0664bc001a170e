use std::sync::LazyLock;

use regex::Regex;

use crate::models::report::{ClinicianInfo, PatientDetails, UNKNOWN};

/// `Name:` label, value is the rest of that line.
static NAME_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)Name[ \t]*:[ \t]*(?P<name>[^\r\n]*)").unwrap());

/// `Age/Gender: 34 Y/Female`
static AGE_GENDER_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Age\s*/\s*Gender\s*:\s*(?P<age>\d+)\s*Y\s*/\s*(?P<gender>\w+)").unwrap()
});

/// First `Dr.` in the text; the name runs to the end of that line.
static CLINICIAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Dr\.[ \t]*(?P<name>[^\r\n]*)").unwrap());

/// Scan the whole report for patient identity labels.
///
/// Each field is independent; a missing label leaves that field as `"unknown"`.
pub fn extract_patient_details(text: &str) -> PatientDetails {
    let name = NAME_LABEL
        .captures(text)
        .and_then(|caps| non_empty(caps.name("name")?.as_str()));

    let (age, gender) = match AGE_GENDER_LABEL.captures(text) {
        Some(caps) => (
            caps.name("age").and_then(|m| non_empty(m.as_str())),
            caps.name("gender").and_then(|m| non_empty(m.as_str())),
        ),
        None => (None, None),
    };

    PatientDetails {
        name: name.unwrap_or_else(|| UNKNOWN.to_string()),
        age: age.unwrap_or_else(|| UNKNOWN.to_string()),
        gender: gender.unwrap_or_else(|| UNKNOWN.to_string()),
        date: None,
    }
}

/// Referring clinician: whatever follows the first `Dr.` on its line.
pub fn extract_clinician_info(text: &str) -> ClinicianInfo {
    let name = CLINICIAN
        .captures(text)
        .and_then(|caps| non_empty(caps.name("name")?.as_str()));

    ClinicianInfo {
        name: name.unwrap_or_else(|| UNKNOWN.to_string()),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
