//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;
use crate::pipeline::strategy::StrategyKind;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub strategy: StrategyKind,
    /// Backend of the configured text-understanding service, if any.
    pub service: Option<&'static str>,
}

/// `GET /api/health`: liveness plus the active parsing setup.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        strategy: ctx.default_strategy,
        service: ctx.parsers.service_backend(),
    })
}
