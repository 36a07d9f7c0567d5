//! Completion driver trait.

use async_trait::async_trait;
use lectern_error::GenerationError;

/// Sampling parameters for one completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionParams {
    /// Sampling temperature
    pub temperature: f64,
    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

impl CompletionParams {
    /// Parameters for lesson generation: high variety, long output.
    pub const LESSON: Self = Self {
        temperature: 0.9,
        max_tokens: 2500,
    };

    /// Parameters for a short connectivity check.
    pub const CONNECTIVITY: Self = Self {
        temperature: 0.7,
        max_tokens: 500,
    };
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self::LESSON
    }
}

/// Something that turns a prompt into completion text.
#[async_trait]
pub trait CompletionDriver: Send + Sync {
    /// Sends one user prompt and returns the first choice's content.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] for a missing key, transport failure,
    /// non-success status or unparseable reply.
    async fn complete(
        &self,
        prompt: &str,
        params: CompletionParams,
    ) -> Result<String, GenerationError>;

    /// Model identifier recorded in artifact headers.
    fn model_name(&self) -> &str;
}
