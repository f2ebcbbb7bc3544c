//! LLM Provider trait — the seam between the agent loops and the model.
//!
//! The `HttpProvider` in `http_provider.rs` covers OpenAI-compatible APIs;
//! tests plug in scripted providers.

use async_trait::async_trait;
use pactum_core::error::ModelRequestError;
use pactum_core::types::{LlmResponse, Message, ToolDefinition};

/// Configuration passed to each LLM call.
#[derive(Clone, Debug, PartialEq)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Optional structured-output schema (`response_format`), not validated here.
    pub response_format: Option<serde_json::Value>,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.7,
            response_format: None,
        }
    }
}

/// Trait that all LLM providers must implement.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request.
    ///
    /// # Arguments
    /// * `messages` — Conversation so far, in order.
    /// * `tools`    — Tool definitions the model may call.
    /// * `model`    — Model identifier (e.g. `"gpt-4o-mini"`).
    /// * `config`   — Temperature, max_tokens, response format.
    ///
    /// # Returns
    /// An `LlmResponse` with content and/or tool calls, or the reason the
    /// request failed. Callers decide whether to retry.
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ModelRequestError>;

    /// The default model for this provider instance.
    fn default_model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
