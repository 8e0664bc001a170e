pub mod types;
pub mod prompt;
pub mod sanitize;
pub mod parser;
pub mod ollama;
pub mod openai;
pub mod adapter;

pub use types::*;
pub use prompt::*;
pub use sanitize::*;
pub use parser::*;
pub use ollama::*;
pub use openai::*;
pub use adapter::*;

use thiserror::Error;

/// Failures reaching the text-understanding service.
///
/// An unreadable *reply* is not an error: it degrades to a freeform report.
/// Every variant here is a transport-level failure for the current request.
#[derive(Error, Debug)]
pub enum StructuringError {
    #[error("Text-understanding service is not reachable at {0}")]
    Connection(String),

    #[error("Text-understanding service timed out after {0}s")]
    Timeout(u64),

    #[error("Text-understanding service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response envelope could not be read: {0}")]
    ResponseParsing(String),

    #[error("Text-understanding service is not configured: {0}")]
    NotConfigured(String),
}

impl StructuringError {
    /// Worth retrying later: the service or network was at fault, not the request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StructuringError::Connection(_)
                | StructuringError::Timeout(_)
                | StructuringError::Service { .. }
                | StructuringError::HttpClient(_)
        )
    }
}

/// Map a reqwest transport error onto the structuring taxonomy.
pub(crate) fn map_transport_error(
    e: reqwest::Error,
    base_url: &str,
    timeout_secs: u64,
) -> StructuringError {
    if e.is_connect() {
        StructuringError::Connection(base_url.to_string())
    } else if e.is_timeout() {
        StructuringError::Timeout(timeout_secs)
    } else {
        StructuringError::HttpClient(e.to_string())
    }
}
