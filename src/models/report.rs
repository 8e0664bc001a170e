use serde::{Deserialize, Serialize};

/// Sentinel for identity fields that could not be found in the report text.
pub const UNKNOWN: &str = "unknown";

fn unknown() -> String {
    UNKNOWN.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDetails {
    #[serde(default = "unknown")]
    pub name: String,
    #[serde(default = "unknown")]
    pub age: String,
    #[serde(default = "unknown")]
    pub gender: String,
    /// Report or collection date. Only a text-understanding service fills it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Default for PatientDetails {
    fn default() -> Self {
        Self {
            name: unknown(),
            age: unknown(),
            gender: unknown(),
            date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicianInfo {
    #[serde(default = "unknown")]
    pub name: String,
}

impl Default for ClinicianInfo {
    fn default() -> Self {
        Self { name: unknown() }
    }
}

/// One test row. `category` is the most recent heading seen above the row
/// and is empty when the row precedes every heading.
///
/// `status` and `remarks` are only ever copied from a text-understanding
/// service reply; the rule-based path leaves them unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub category: String,
    pub test: String,
    pub value: String,
    pub reference_range: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl Measurement {
    pub fn new(category: &str, test: &str, value: &str, reference_range: &str) -> Self {
        Self {
            category: category.to_string(),
            test: test.to_string(),
            value: value.to_string(),
            reference_range: reference_range.to_string(),
            status: None,
            remarks: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredReport {
    pub patient_details: PatientDetails,
    pub clinician_info: ClinicianInfo,
    pub measurements: Vec<Measurement>,
}

impl StructuredReport {
    pub fn has_measurements(&self) -> bool {
        !self.measurements.is_empty()
    }
}

/// Service reply that could not be read as a structured report, kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeformReport {
    pub raw_text: String,
}

/// Output of every parsing strategy.
///
/// Serialized untagged: consumers see either the structured shape or
/// `{"rawText": ...}`, never a wrapper object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Report {
    Structured(StructuredReport),
    Freeform(FreeformReport),
}

impl Report {
    pub fn as_structured(&self) -> Option<&StructuredReport> {
        match self {
            Report::Structured(report) => Some(report),
            Report::Freeform(_) => None,
        }
    }

    pub fn is_freeform(&self) -> bool {
        matches!(self, Report::Freeform(_))
    }

    /// Number of measurement rows; zero for a freeform report.
    pub fn measurement_count(&self) -> usize {
        match self {
            Report::Structured(report) => report.measurements.len(),
            Report::Freeform(_) => 0,
        }
    }
}

impl From<StructuredReport> for Report {
    fn from(report: StructuredReport) -> Self {
        Report::Structured(report)
    }
}

impl From<FreeformReport> for Report {
    fn from(report: FreeformReport) -> Self {
        Report::Freeform(report)
    }
}
