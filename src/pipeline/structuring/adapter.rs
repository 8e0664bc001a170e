use std::sync::atomic::{AtomicUsize, Ordering};

use super::parser::parse_service_reply;
use super::prompt::{build_report_prompt, REPORT_SYSTEM_PROMPT};
use super::sanitize::sanitize_report_text;
use super::types::LlmClient;
use super::StructuringError;
use crate::models::report::Report;

/// Hands report text to a text-understanding service and reads the reply:
/// sanitize → prompt → service → parse (structured or freeform).
///
/// One call per report, no retry. Only transport failures are errors.
pub struct ServiceStructurer {
    llm: Box<dyn LlmClient + Send + Sync>,
    model_name: String,
}

impl ServiceStructurer {
    pub fn new(llm: Box<dyn LlmClient + Send + Sync>, model_name: &str) -> Self {
        Self {
            llm,
            model_name: model_name.to_string(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn backend(&self) -> &'static str {
        self.llm.backend()
    }

    pub fn structure_via_service(&self, text: &str) -> Result<Report, StructuringError> {
        let _span = tracing::info_span!(
            "structure_via_service",
            backend = self.llm.backend(),
            model = %self.model_name,
        )
        .entered();

        let sanitized = sanitize_report_text(text);
        let prompt = build_report_prompt(&sanitized);

        let reply = self
            .llm
            .generate(&self.model_name, &prompt, REPORT_SYSTEM_PROMPT)
            .inspect_err(|e| {
                tracing::error!(error = %e, "Text-understanding service call failed");
            })?;

        let report = parse_service_reply(&reply);
        tracing::info!(
            input_len = text.len(),
            reply_len = reply.len(),
            freeform = report.is_freeform(),
            measurements = report.measurement_count(),
            "Service structuring complete"
        );
        Ok(report)
    }
}

/// Mock text-understanding service for testing: returns a configured reply
/// or a configured failure, and counts calls.
pub struct MockLlmClient {
    reply: Result<String, u16>,
    calls: AtomicUsize,
}

impl MockLlmClient {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails with a service error carrying `status`.
    pub fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LlmClient for MockLlmClient {
    fn generate(
        &self,
        _model: &str,
        _prompt: &str,
        _system: &str,
    ) -> Result<String, StructuringError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(reply) => Ok(reply.clone()),
            Err(status) => Err(StructuringError::Service {
                status: *status,
                body: "mock failure".into(),
            }),
        }
    }

    fn backend(&self) -> &'static str {
        "mock"
    }
}

impl<T: LlmClient + ?Sized> LlmClient for std::sync::Arc<T> {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
    ) -> Result<String, StructuringError> {
        (**self).generate(model, prompt, system)
    }

    fn backend(&self) -> &'static str {
        (**self).backend()
    }
}
