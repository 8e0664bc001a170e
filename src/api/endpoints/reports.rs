//! Report parsing endpoint.
//!
//! `POST /api/reports/parse` (also mounted at `/upload-report`) takes the
//! text already extracted from a lab report and returns the parsed report.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::report::Report;
use crate::pipeline::strategy::StrategyKind;

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub text: String,
    /// Overrides the configured default strategy for this request.
    #[serde(default)]
    pub strategy: Option<StrategyKind>,
}

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub data: Report,
    pub strategy: StrategyKind,
}

pub async fn parse(
    State(ctx): State<ApiContext>,
    payload: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<ParseResponse>, ApiError> {
    let Json(request) = payload?;
    let strategy = request.strategy.unwrap_or(ctx.default_strategy);
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("parse_report", %request_id, %strategy);

    async move {
        if request.text.trim().is_empty() {
            return Err(ApiError::BadRequest("Report text is empty".into()));
        }

        let input_len = request.text.len();
        let parsers = Arc::clone(&ctx.parsers);
        let text = request.text;
        let task_span = tracing::Span::current();

        // Service-backed strategies block on HTTP.
        let report = tokio::task::spawn_blocking(move || {
            task_span.in_scope(|| parsers.parse(strategy, &text))
        })
        .await
        .map_err(|e| ApiError::Internal(format!("Parse task failed: {e}")))??;

        tracing::info!(
            input_len,
            measurements = report.measurement_count(),
            freeform = report.is_freeform(),
            "Report parsed"
        );

        Ok(Json(ParseResponse {
            data: report,
            strategy,
        }))
    }
    .instrument(span)
    .await
}
