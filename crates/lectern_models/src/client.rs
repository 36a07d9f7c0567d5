//! HTTP client for OpenAI-compatible chat-completion endpoints.

use crate::{ChatMessage, ChatRequest, CompletionDriver, CompletionParams, parse_completion};
use async_trait::async_trait;
use lectern_error::{GenerationError, GenerationErrorKind, HttpError};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Request timeout for lesson generation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// OpenRouter (or any OpenAI-compatible) chat-completion client.
///
/// The API key is optional so that a client can always be constructed;
/// calls without a key fail fast with [`GenerationErrorKind::MissingApiKey`]
/// and never touch the network.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    client: Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
    timeout: Duration,
}

impl OpenRouterClient {
    /// Creates a client with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(
        api_key: Option<String>,
        api_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, HttpError> {
        Self::with_timeout(api_key, api_url, model, DEFAULT_TIMEOUT)
    }

    /// Creates a client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    #[instrument(skip(api_key, api_url, model))]
    pub fn with_timeout(
        api_key: Option<String>,
        api_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::new(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_key,
            api_url: api_url.into(),
            model: model.into(),
            timeout,
        })
    }

    /// Endpoint URL.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn request_body(&self, prompt: &str, params: CompletionParams) -> ChatRequest {
        ChatRequest::new(
            self.model.clone(),
            vec![ChatMessage::user(prompt)],
            params.temperature,
            params.max_tokens,
        )
    }
}

#[async_trait]
impl CompletionDriver for OpenRouterClient {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(
        &self,
        prompt: &str,
        params: CompletionParams,
    ) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GenerationError::new(GenerationErrorKind::MissingApiKey))?;

        let body = self.request_body(prompt, params);
        debug!(url = %self.api_url, "Sending completion request");

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::new(GenerationErrorKind::Timeout(self.timeout.as_secs()))
                } else {
                    GenerationError::new(GenerationErrorKind::Transport(e.to_string()))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::new(GenerationErrorKind::Transport(e.to_string())))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Completion request rejected");
            return Err(GenerationError::new(GenerationErrorKind::Status {
                status: status.as_u16(),
                body: text,
            }));
        }

        let content = parse_completion(&text)?;
        debug!(content_len = content.len(), "Completion received");
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
