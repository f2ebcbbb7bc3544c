//! OpenAI-compatible `/chat/completions` client.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, warn};

use pactum_core::config::ProviderConfig;
use pactum_core::error::ModelRequestError;
use pactum_core::types::{
    ChatCompletionRequest, ChatCompletionResponse, LlmResponse, Message, ToolDefinition,
};

use crate::traits::{LlmProvider, LlmRequestConfig};

/// Used when the config doesn't set `apiBase`.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

pub struct HttpProvider {
    client: reqwest::Client,
    /// Full `…/chat/completions` URL.
    endpoint: String,
    api_key: String,
    default_model: String,
    headers: HeaderMap,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("endpoint", &self.endpoint)
            .field("default_model", &self.default_model)
            .finish_non_exhaustive()
    }
}

impl HttpProvider {
    pub fn new(config: &ProviderConfig, model: &str) -> Result<Self, ModelRequestError> {
        let base = config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);

        // Each request is bounded by the model client, not here.
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ModelRequestError::Transport(e.to_string()))?;

        Ok(HttpProvider {
            client,
            endpoint: format!("{}/chat/completions", base.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            default_model: model.to_string(),
            headers: header_map(config.extra_headers.as_ref()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Valid extra headers; invalid names or values are skipped with a warning.
fn header_map(extra: Option<&HashMap<String, String>>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in extra.into_iter().flatten() {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!(header = %name, "skipping invalid extra header"),
        }
    }
    headers
}

async fn decode(response: reqwest::Response) -> Result<LlmResponse, ModelRequestError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(status = status.as_u16(), body = %body, "provider rejected request");
        return Err(ModelRequestError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let body: ChatCompletionResponse = response.json().await.map_err(|e| {
        error!(error = %e, "provider response is not a chat completion");
        ModelRequestError::Decode(e.to_string())
    })?;
    LlmResponse::try_from(body)
}

#[async_trait]
impl LlmProvider for HttpProvider {
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ModelRequestError> {
        let body = ChatCompletionRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            tools: tools.map(<[ToolDefinition]>::to_vec),
            tool_choice: tools.map(|_| "auto".to_string()),
            max_tokens: Some(config.max_tokens),
            temperature: Some(config.temperature),
            response_format: config.response_format.clone(),
        };
        debug!(
            model,
            messages = messages.len(),
            tools = tools.map_or(0, <[ToolDefinition]>::len),
            "posting chat completion"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, endpoint = %self.endpoint, "chat completion request failed");
                ModelRequestError::Transport(e.to_string())
            })?;

        let answer = decode(response).await?;
        debug!(
            tool_calls = answer.tool_calls.len(),
            finish_reason = answer.finish_reason.as_deref().unwrap_or("-"),
            "chat completion received"
        );
        Ok(answer)
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn display_name(&self) -> &str {
        "OpenAI-compatible"
    }
}

/// Provider for the configured endpoint. Fails when no API key is set.
pub fn create_provider(config: &ProviderConfig, model: &str) -> Result<HttpProvider, String> {
    if !config.is_configured() {
        return Err(format!(
            "No API key configured for model '{model}'. Set provider.apiKey in the config, \
             PACTUM_PROVIDER__API_KEY or OPENAI_API_KEY."
        ));
    }
    let provider = HttpProvider::new(config, model).map_err(|e| e.to_string())?;
    debug!(model, endpoint = provider.endpoint(), "provider ready");
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_config(base: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            api_key: "sk-contracts".into(),
            api_base: base.map(str::to_string),
            extra_headers: None,
        }
    }

    async fn server_answering(template: ResponseTemplate) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(template)
            .mount(&server)
            .await;
        server
    }

    async fn ask(provider: &HttpProvider) -> Result<LlmResponse, ModelRequestError> {
        provider
            .chat(&[Message::user("Process Contract #101")], None, "gpt-4o-mini", &LlmRequestConfig::default())
            .await
    }

    #[test]
    fn test_endpoint_defaults_and_trailing_slash() {
        let default = HttpProvider::new(&provider_config(None), "gpt-4o-mini").unwrap();
        assert_eq!(default.endpoint(), "https://api.openai.com/v1/chat/completions");
        assert_eq!(default.default_model(), "gpt-4o-mini");

        let custom = HttpProvider::new(&provider_config(Some("http://localhost:8080/v1/")), "m").unwrap();
        assert_eq!(custom.endpoint(), "http://localhost:8080/v1/chat/completions");
    }

    #[test]
    fn test_invalid_extra_headers_are_skipped() {
        let extra = HashMap::from([
            ("X-Contract-Batch".to_string(), "2025-q1".to_string()),
            ("bad header".to_string(), "x".to_string()),
        ]);
        let headers = header_map(Some(&extra));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["x-contract-batch"], "2025-q1");
        assert!(header_map(None).is_empty());
    }

    #[tokio::test]
    async fn test_handoff_call_is_returned_with_raw_arguments() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer sk-contracts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-handoff",
                "choices": [{
                    "message": {
                        "content": null,
                        "tool_calls": [{
                            "id": "call_terms",
                            "type": "function",
                            "function": { "name": "transferToTermsAgent", "arguments": "{\"documentId\": 101}" }
                        }]
                    },
                    "finish_reason": "tool_calls"
                }]
            })))
            .mount(&server)
            .await;

        let provider = HttpProvider::new(&provider_config(Some(&server.uri())), "gpt-4o-mini").unwrap();
        let handoff = ToolDefinition::new(
            "transferToTermsAgent",
            "Hand over to the terms agent",
            json!({"type": "object", "properties": {"documentId": {"type": "number"}}}),
        );
        let answer = provider
            .chat(&[Message::user("Go")], Some(&[handoff]), "gpt-4o-mini", &LlmRequestConfig::default())
            .await
            .unwrap();

        assert_eq!(answer.content, None);
        assert_eq!(answer.tool_calls.len(), 1);
        assert_eq!(answer.tool_calls[0].id, "call_terms");
        assert_eq!(answer.tool_calls[0].arguments(), "{\"documentId\": 101}");
    }

    #[tokio::test]
    async fn test_request_body_carries_tools_and_response_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "max_tokens": 4096,
                "tool_choice": "auto",
                "tools": [{ "type": "function", "function": { "name": "accessState", "strict": true } }],
                "response_format": { "type": "json_object" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "ok" }, "finish_reason": "stop" }]
            })))
            .mount(&server)
            .await;

        let provider = HttpProvider::new(&provider_config(Some(&server.uri())), "gpt-4o-mini").unwrap();
        let tool = ToolDefinition::new("accessState", "Read state", json!({"type": "object"})).strict();
        let config = LlmRequestConfig {
            response_format: Some(json!({ "type": "json_object" })),
            ..Default::default()
        };
        let answer = provider
            .chat(&[Message::user("state?")], Some(&[tool]), "gpt-4o-mini", &config)
            .await
            .unwrap();

        // wiremock answers 404 on a body mismatch, which would be an Err.
        assert_eq!(answer.content.as_deref(), Some("ok"));
    }

    #[tokio::test]
    async fn test_http_error_status_is_reported() {
        let server = server_answering(ResponseTemplate::new(429).set_body_string("Rate limit exceeded")).await;
        let provider = HttpProvider::new(&provider_config(Some(&server.uri())), "gpt-4o-mini").unwrap();

        assert_eq!(
            ask(&provider).await.unwrap_err(),
            ModelRequestError::Status {
                status: 429,
                body: "Rate limit exceeded".into()
            }
        );
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let server = server_answering(ResponseTemplate::new(200).set_body_string("<html>bad gateway</html>")).await;
        let provider = HttpProvider::new(&provider_config(Some(&server.uri())), "gpt-4o-mini").unwrap();
        assert!(matches!(ask(&provider).await, Err(ModelRequestError::Decode(_))));
    }

    #[tokio::test]
    async fn test_empty_choices_is_decode_error() {
        let server = server_answering(ResponseTemplate::new(200).set_body_json(json!({"choices": []}))).await;
        let provider = HttpProvider::new(&provider_config(Some(&server.uri())), "gpt-4o-mini").unwrap();
        assert!(matches!(ask(&provider).await, Err(ModelRequestError::Decode(_))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Port 1 is never listening.
        let provider = HttpProvider::new(&provider_config(Some("http://127.0.0.1:1")), "gpt-4o-mini").unwrap();
        assert!(matches!(ask(&provider).await, Err(ModelRequestError::Transport(_))));
    }

    #[test]
    fn test_create_provider_needs_key() {
        let missing = ProviderConfig::default();
        let err = create_provider(&missing, "gpt-4o-mini").unwrap_err();
        assert!(err.contains("No API key configured for model 'gpt-4o-mini'"));

        let provider = create_provider(&provider_config(None), "gpt-4o-mini").unwrap();
        assert_eq!(provider.display_name(), "OpenAI-compatible");
    }
}
