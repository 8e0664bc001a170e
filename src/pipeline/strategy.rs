//! Report parsing strategies behind one `ReportParser` interface.
//!
//! - `RuleBasedParser`: section/line heuristics, never fails.
//! - `ServiceParser`: text-understanding service, fails only on transport.
//! - `ChainedParser`: rules first, service when the rules found no rows.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::report::Report;
use crate::pipeline::rules::{assemble_with_stats, SectionMarkers};
use crate::pipeline::structuring::{ServiceStructurer, StructuringError};

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

/// Caller-selectable parsing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[serde(alias = "rules")]
    RuleBased,
    #[serde(alias = "llm")]
    Service,
    #[default]
    #[serde(alias = "auto")]
    Chained,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RuleBased => write!(f, "rule_based"),
            Self::Service => write!(f, "service"),
            Self::Chained => write!(f, "chained"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown parsing strategy: {0}")]
pub struct UnknownStrategy(pub String);

impl FromStr for StrategyKind {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rules" | "rule_based" | "rule-based" => Ok(Self::RuleBased),
            "service" | "llm" => Ok(Self::Service),
            "chained" | "auto" => Ok(Self::Chained),
            other => Err(UnknownStrategy(other.to_string())),
        }
    }
}

/// Turns extracted report text into a report.
pub trait ReportParser: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn parse(&self, text: &str) -> Result<Report, StructuringError>;
}

// ═══════════════════════════════════════════════════════════
// Strategies
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct RuleBasedParser {
    markers: SectionMarkers,
}

impl RuleBasedParser {
    pub fn new(markers: SectionMarkers) -> Self {
        Self { markers }
    }
}

impl ReportParser for RuleBasedParser {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RuleBased
    }

    fn parse(&self, text: &str) -> Result<Report, StructuringError> {
        let (report, stats) = assemble_with_stats(text, &self.markers);
        if stats.dropped > 0 {
            tracing::info!(
                dropped_lines = stats.dropped,
                measurements = stats.measurements,
                "Rule-based parsing skipped unrecognized lines"
            );
        }
        Ok(Report::Structured(report))
    }
}

#[derive(Clone)]
pub struct ServiceParser {
    structurer: Arc<ServiceStructurer>,
}

impl ServiceParser {
    pub fn new(structurer: Arc<ServiceStructurer>) -> Self {
        Self { structurer }
    }
}

impl ReportParser for ServiceParser {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Service
    }

    fn parse(&self, text: &str) -> Result<Report, StructuringError> {
        self.structurer.structure_via_service(text)
    }
}

/// Rules first; the service only sees reports the rules could not read.
/// Without a configured service the rule-based report is returned as is.
#[derive(Clone)]
pub struct ChainedParser {
    rules: RuleBasedParser,
    service: Option<ServiceParser>,
}

impl ChainedParser {
    pub fn new(rules: RuleBasedParser, service: Option<ServiceParser>) -> Self {
        Self { rules, service }
    }
}

impl ReportParser for ChainedParser {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Chained
    }

    fn parse(&self, text: &str) -> Result<Report, StructuringError> {
        let report = self.rules.parse(text)?;
        if report.measurement_count() > 0 {
            return Ok(report);
        }

        match &self.service {
            Some(service) => {
                tracing::info!("Rule-based parsing found no measurements, delegating to service");
                service.parse(text)
            }
            None => {
                tracing::warn!("Rule-based parsing found no measurements and no service is configured");
                Ok(report)
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Selection
// ═══════════════════════════════════════════════════════════

/// All strategies available to a caller, built once and shared.
#[derive(Clone)]
pub struct ReportParsers {
    rules: RuleBasedParser,
    service: Option<ServiceParser>,
    chained: ChainedParser,
}

impl ReportParsers {
    pub fn new(markers: SectionMarkers, structurer: Option<ServiceStructurer>) -> Self {
        let rules = RuleBasedParser::new(markers);
        let service = structurer.map(|s| ServiceParser::new(Arc::new(s)));
        let chained = ChainedParser::new(rules.clone(), service.clone());
        Self {
            rules,
            service,
            chained,
        }
    }

    pub fn has_service(&self) -> bool {
        self.service.is_some()
    }

    /// Backend name of the configured service, if any.
    pub fn service_backend(&self) -> Option<&'static str> {
        self.service.as_ref().map(|s| s.structurer.backend())
    }

    /// Resolve the parser for a strategy. Asking for the service strategy
    /// without a configured service is an error.
    pub fn get(&self, kind: StrategyKind) -> Result<&dyn ReportParser, StructuringError> {
        match kind {
            StrategyKind::RuleBased => Ok(&self.rules),
            StrategyKind::Chained => Ok(&self.chained),
            StrategyKind::Service => self
                .service
                .as_ref()
                .map(|s| s as &dyn ReportParser)
                .ok_or_else(|| {
                    StructuringError::NotConfigured("no text-understanding service".into())
                }),
        }
    }

    pub fn parse(&self, kind: StrategyKind, text: &str) -> Result<Report, StructuringError> {
        self.get(kind)?.parse(text)
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
