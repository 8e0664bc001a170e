pub const REPORT_SYSTEM_PROMPT: &str = r#"
You are an assistant that processes health lab reports. Your ONLY role is to
convert the raw report text into a structured record. You extract information
that is explicitly present in the report.

RULES:
1. Extract ONLY information explicitly stated in the report.
2. Copy test values and reference ranges verbatim, including units.
3. If the report states whether a result is healthy or unhealthy, copy it into
   "status"; otherwise leave "status" null. Never compute it yourself.
4. If a patient or clinician field is missing, output "unknown".
5. Output MUST be a single JSON object wrapped in ```json``` fences.
"#;

/// Build the user prompt carrying the report text and the expected shape.
pub fn build_report_prompt(report_text: &str) -> String {
    format!(
        r#"<report>
{report_text}
</report>

Extract the patient details and every test result from the report above into
this JSON structure. Keep the tests in the order they appear. Use the section
heading above each test as its category ("" if there is none).

```json
{{
  "patientDetails": {{
    "name": "full name or unknown",
    "age": "age in years or unknown",
    "gender": "gender or unknown",
    "date": "report or collection date as written, or null"
  }},
  "clinicianInfo": {{
    "name": "referring doctor or unknown"
  }},
  "measurements": [
    {{
      "category": "section heading",
      "test": "test name",
      "value": "result as written",
      "referenceRange": "reference range as written",
      "status": "Healthy | Unhealthy | null",
      "remarks": "precautions or remarks from the report, or null"
    }}
  ]
}}
```
"#
    )
}
