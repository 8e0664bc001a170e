//! API error types with structured JSON responses.

use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::pipeline::structuring::StructuringError;

/// Seconds a client should wait before retrying after a service failure.
pub const SERVICE_RETRY_AFTER_SECS: u64 = 30;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Request body too large")]
    PayloadTooLarge,
    #[error("Text-understanding service unavailable: {detail}")]
    ServiceUnavailable {
        detail: String,
        retry_after: Option<u64>,
    },
    #[error("Text-understanding service not configured: {0}")]
    ServiceNotConfigured(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone()),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                "Request body exceeds the configured limit".to_string(),
            ),
            ApiError::ServiceUnavailable { detail, .. } => {
                tracing::warn!(detail, "Text-understanding service failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "SERVICE_UNAVAILABLE",
                    "The text-understanding service could not be reached. Try again later".to_string(),
                )
            }
            ApiError::ServiceNotConfigured(detail) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_NOT_CONFIGURED",
                format!("No text-understanding service is configured ({detail})"),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };

        let mut response = (status, Json(body)).into_response();
        if let ApiError::ServiceUnavailable {
            retry_after: Some(secs),
            ..
        } = &self
        {
            if let Ok(val) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert("Retry-After", val);
            }
        }
        response
    }
}

impl From<StructuringError> for ApiError {
    fn from(err: StructuringError) -> Self {
        match err {
            StructuringError::NotConfigured(detail) => ApiError::ServiceNotConfigured(detail),
            other => {
                let retry_after = other.is_retryable().then_some(SERVICE_RETRY_AFTER_SECS);
                ApiError::ServiceUnavailable {
                    detail: other.to_string(),
                    retry_after,
                }
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    }
}
