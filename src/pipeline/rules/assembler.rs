use serde::Serialize;

use super::classify::{classify_line, LineKind};
use super::identity::{extract_clinician_info, extract_patient_details};
use super::section::{locate_section, SectionMarkers};
use crate::models::report::{Measurement, StructuredReport};

/// Line counts from one assembly pass. `dropped` counts non-blank lines
/// that were neither a heading nor a measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssemblyStats {
    pub lines_seen: usize,
    pub headings: usize,
    pub measurements: usize,
    pub dropped: usize,
}

/// Accumulator threaded through the fold over section lines.
#[derive(Default)]
struct Accumulator<'a> {
    category: &'a str,
    measurements: Vec<Measurement>,
    stats: AssemblyStats,
}

/// Build a structured report with the default section markers.
pub fn assemble(text: &str) -> StructuredReport {
    assemble_with(text, &SectionMarkers::default())
}

pub fn assemble_with(text: &str, markers: &SectionMarkers) -> StructuredReport {
    assemble_with_stats(text, markers).0
}

/// Rule-based report plus line statistics. Never fails: missing markers,
/// labels or rows show up as an empty measurement list and `"unknown"` fields.
pub fn assemble_with_stats(text: &str, markers: &SectionMarkers) -> (StructuredReport, AssemblyStats) {
    let section = locate_section(text, markers);
    let (measurements, stats) = collect_measurements(section);

    tracing::debug!(
        section_len = section.len(),
        lines = stats.lines_seen,
        headings = stats.headings,
        measurements = stats.measurements,
        dropped_lines = stats.dropped,
        "Rule-based assembly complete"
    );

    let report = StructuredReport {
        patient_details: extract_patient_details(text),
        clinician_info: extract_clinician_info(text),
        measurements,
    };
    (report, stats)
}

/// Single pass over the section lines. A heading replaces the current
/// category; a measurement is emitted under it; everything else is skipped.
pub fn collect_measurements(section: &str) -> (Vec<Measurement>, AssemblyStats) {
    let acc = section
        .lines()
        .fold(Accumulator::default(), |mut acc, line| {
            acc.stats.lines_seen += 1;
            match classify_line(line) {
                LineKind::Heading(heading) => {
                    acc.stats.headings += 1;
                    acc.category = heading;
                }
                LineKind::Measurement(fields) => {
                    acc.stats.measurements += 1;
                    acc.measurements.push(Measurement::new(
                        acc.category,
                        fields.test,
                        fields.value,
                        fields.reference_range,
                    ));
                }
                LineKind::Noise => {
                    if !line.trim().is_empty() {
                        acc.stats.dropped += 1;
                    }
                }
            }
            acc
        });

    (acc.measurements, acc.stats)
}
