use super::StructuringError;

/// Text-understanding service abstraction (allows mocking).
///
/// One call, one reply: the implementation sends the instruction and prompt
/// and returns the reply text exactly as produced.
pub trait LlmClient {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: &str,
    ) -> Result<String, StructuringError>;

    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;
}

/// Per-call generation settings shared by the HTTP clients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_tokens: 2000,
            temperature: 0.7,
        }
    }
}
