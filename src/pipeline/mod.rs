pub mod rules; // Section / line heuristics
pub mod structuring; // Text-understanding service adapter
pub mod strategy; // ReportParser strategies
