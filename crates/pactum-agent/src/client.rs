//! Model client — every model request the loops make goes through here.
//!
//! Wraps an [`LlmProvider`] with a per-request timeout and bounded retry with
//! exponential backoff. A request that still fails after the last attempt is
//! a [`RunError`]: the run cannot continue without the model.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, warn};

use pactum_core::config::Config;
use pactum_core::error::ModelRequestError;
use pactum_core::types::{LlmResponse, Message, ToolDefinition};
use pactum_providers::traits::{LlmProvider, LlmRequestConfig};

/// Fatal run failure.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{agent} agent: model request failed after {attempts} attempt(s): {source}")]
    Model {
        agent: String,
        attempts: u32,
        #[source]
        source: ModelRequestError,
    },
}

/// Provider + model + request bounds, shared by the controller and specialists.
pub struct ModelClient {
    provider: Arc<dyn LlmProvider>,
    model: String,
    request_config: LlmRequestConfig,
    timeout: Duration,
    max_attempts: u32,
    backoff: Duration,
}

impl ModelClient {
    /// Create a client with default bounds (120 s timeout, 3 attempts, 500 ms backoff).
    pub fn new(provider: Arc<dyn LlmProvider>, model: Option<String>) -> Self {
        let model = model.unwrap_or_else(|| provider.default_model().to_string());
        Self {
            provider,
            model,
            request_config: LlmRequestConfig::default(),
            timeout: Duration::from_secs(120),
            max_attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }

    /// Create a client from the `agent` and `orchestration` config sections.
    pub fn from_config(provider: Arc<dyn LlmProvider>, config: &Config) -> Self {
        let orch = &config.orchestration;
        Self::new(provider, Some(config.agent.model.clone()))
            .with_request_config(LlmRequestConfig {
                max_tokens: config.agent.max_tokens,
                temperature: config.agent.temperature,
                response_format: None,
            })
            .with_timeout(Duration::from_secs(orch.request_timeout_secs))
            .with_retry(orch.max_attempts, Duration::from_millis(orch.retry_backoff_ms))
    }

    pub fn with_request_config(mut self, request_config: LlmRequestConfig) -> Self {
        self.request_config = request_config;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attempts per request (at least 1) and the delay before the first retry.
    pub fn with_retry(mut self, max_attempts: u32, backoff: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.backoff = backoff;
        self
    }

    /// Model identifier sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Provider display name.
    pub fn provider_name(&self) -> &str {
        self.provider.display_name()
    }

    /// Request one completion on behalf of `agent`.
    pub async fn complete(
        &self,
        agent: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<LlmResponse, RunError> {
        let tools = (!tools.is_empty()).then_some(tools);
        let mut delay = self.backoff;
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(
                agent,
                attempt,
                messages = messages.len(),
                "requesting completion"
            );

            let request = self
                .provider
                .chat(messages, tools, &self.model, &self.request_config);
            let outcome = match tokio::time::timeout(self.timeout, request).await {
                Ok(result) => result,
                Err(_) => Err(ModelRequestError::Timeout {
                    secs: self.timeout.as_secs(),
                }),
            };

            match outcome {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.max_attempts => {
                    warn!(
                        agent,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "model request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => {
                    error!(agent, attempts = attempt, error = %e, "model request failed");
                    return Err(RunError::Model {
                        agent: agent.to_string(),
                        attempts: attempt,
                        source: e,
                    });
                }
            }
        }
    }
}
