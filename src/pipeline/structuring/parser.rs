use serde::Deserialize;

use crate::models::report::{
    ClinicianInfo, FreeformReport, Measurement, PatientDetails, Report, StructuredReport, UNKNOWN,
};

/// Read a service reply as a structured report, or keep it verbatim.
///
/// Never fails: anything that is not a JSON object with a measurement array
/// becomes `Report::Freeform` carrying the exact reply.
pub fn parse_service_reply(reply: &str) -> Report {
    match parse_structured_reply(reply) {
        Some(report) => Report::Structured(report),
        None => {
            tracing::warn!(
                reply_len = reply.len(),
                "Service reply is not structured data, returning raw text"
            );
            Report::Freeform(FreeformReport {
                raw_text: reply.to_string(),
            })
        }
    }
}

/// Structured reading of a reply; `None` when the reply has no usable JSON object.
pub fn parse_structured_reply(reply: &str) -> Option<StructuredReport> {
    let json = extract_json_candidate(reply)?;
    let raw: RawReply = serde_json::from_str(json).ok()?;

    let measurements = raw.measurements?;
    let patient = raw.patient_details.unwrap_or_default();
    let clinician = raw.clinician_info.unwrap_or_default();

    Some(StructuredReport {
        patient_details: PatientDetails {
            name: field_or_unknown(patient.name),
            age: field_or_unknown(patient.age),
            gender: field_or_unknown(patient.gender),
            date: optional_field(patient.date),
        },
        clinician_info: ClinicianInfo {
            name: field_or_unknown(clinician.name),
        },
        measurements: parse_measurements_lenient(&measurements),
    })
}

/// Locate the JSON text in a reply: a ```json fenced block, else the span
/// from the first `{` to the last `}`.
fn extract_json_candidate(reply: &str) -> Option<&str> {
    if let Some(fence) = reply.find("```json") {
        let start = fence + "```json".len();
        if let Some(len) = reply[start..].find("```") {
            return Some(reply[start..start + len].trim());
        }
    }

    let open = reply.find('{')?;
    let close = reply.rfind('}')?;
    (close > open).then(|| &reply[open..=close])
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReply {
    #[serde(alias = "patient_details", alias = "patient")]
    patient_details: Option<RawPatient>,
    #[serde(alias = "clinician_info", alias = "clinician", alias = "doctor")]
    clinician_info: Option<RawClinician>,
    #[serde(alias = "tests", alias = "results")]
    measurements: Option<Vec<serde_json::Value>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawPatient {
    #[serde(alias = "Name")]
    name: Option<serde_json::Value>,
    #[serde(alias = "Age")]
    age: Option<serde_json::Value>,
    #[serde(alias = "Gender", alias = "sex")]
    gender: Option<serde_json::Value>,
    #[serde(alias = "Date", alias = "reportDate", alias = "report_date")]
    date: Option<serde_json::Value>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawClinician {
    #[serde(alias = "Name")]
    name: Option<serde_json::Value>,
}

/// Render a scalar JSON value as text. Numbers keep their JSON spelling.
fn scalar_text(value: &serde_json::Value) -> Option<String> {
    let text = match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

fn optional_field(value: Option<serde_json::Value>) -> Option<String> {
    value
        .as_ref()
        .and_then(scalar_text)
        .filter(|text| !text.eq_ignore_ascii_case("null"))
}

fn field_or_unknown(value: Option<serde_json::Value>) -> String {
    optional_field(value).unwrap_or_else(|| UNKNOWN.to_string())
}

/// Parse measurement items leniently: items without a test name and a value
/// are skipped, other fields default to empty / absent.
fn parse_measurements_lenient(items: &[serde_json::Value]) -> Vec<Measurement> {
    items.iter().filter_map(parse_measurement_item).collect()
}

fn parse_measurement_item(item: &serde_json::Value) -> Option<Measurement> {
    let object = item.as_object()?;
    let field = |keys: &[&str]| -> Option<String> {
        keys.iter()
            .filter_map(|key| object.get(*key))
            .find_map(scalar_text)
    };

    let test = field(&["test", "Test", "testName", "test_name"])?;
    let value = field(&["value", "Value", "result", "Result"])?;

    Some(Measurement {
        category: field(&["category", "Category"]).unwrap_or_default(),
        test,
        value,
        reference_range: field(&[
            "referenceRange",
            "reference_range",
            "Reference Range",
            "healthyRange",
            "range",
        ])
        .unwrap_or_default(),
        status: field(&["status", "Status"]),
        remarks: field(&["remarks", "Remarks", "precautions", "Precautions"]),
    })
}
