//! Shared state for the HTTP layer.

use std::sync::Arc;

use crate::pipeline::strategy::{ReportParsers, StrategyKind};

/// Shared context for all API routes.
///
/// Built once at startup; handlers never read configuration themselves.
#[derive(Clone)]
pub struct ApiContext {
    pub parsers: Arc<ReportParsers>,
    pub default_strategy: StrategyKind,
}

impl ApiContext {
    pub fn new(parsers: Arc<ReportParsers>, default_strategy: StrategyKind) -> Self {
        Self {
            parsers,
            default_strategy,
        }
    }
}
