//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentConfig`, `ProviderConfig`,
//! `OrchestrationConfig`, `TaskConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.pactum/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agent: AgentConfig,
    pub provider: ProviderConfig,
    pub orchestration: OrchestrationConfig,
    pub task: TaskConfig,
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// Model settings shared by the controller and every specialist.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    /// Model identifier sent with every request.
    pub model: String,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// Connection settings for the OpenAI-compatible endpoint.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for bearer authentication.
    pub api_key: String,
    /// Custom API base URL. Defaults to the OpenAI endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Extra HTTP headers sent with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ProviderConfig {
    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// ─────────────────────────────────────────────
// Orchestration
// ─────────────────────────────────────────────

/// Termination and retry bounds for the loops.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct OrchestrationConfig {
    /// Model requests the controller may make before the run is incomplete.
    pub max_controller_iterations: u32,
    /// Model requests one specialist session may make before it is abnormal.
    pub max_specialist_iterations: u32,
    /// Timeout applied to each model request.
    pub request_timeout_secs: u64,
    /// Attempts per model request (1 = no retry).
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub retry_backoff_ms: u64,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            max_controller_iterations: 25,
            max_specialist_iterations: 25,
            request_timeout_secs: 120,
            max_attempts: 3,
            retry_backoff_ms: 500,
        }
    }
}

// ─────────────────────────────────────────────
// Task
// ─────────────────────────────────────────────

/// The contract to process and the opening instruction to the controller.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskConfig {
    pub document_id: u64,
    /// Overrides the standard instruction built from `document_id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl TaskConfig {
    /// Standard instruction for processing one contract end to end.
    pub fn standard_prompt(document_id: u64) -> String {
        format!("Please process Contract #{document_id} from start to finish!")
    }

    /// The configured prompt, or the standard one for `document_id`.
    pub fn opening_prompt(&self) -> String {
        self.prompt
            .clone()
            .unwrap_or_else(|| Self::standard_prompt(self.document_id))
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            document_id: 101,
            prompt: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.agent.model, "gpt-4o-mini");
        assert_eq!(config.orchestration.max_specialist_iterations, 25);
        assert_eq!(config.orchestration.max_attempts, 3);
        assert_eq!(config.task.document_id, 101);
        assert!(!config.provider.is_configured());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"orchestration": {"maxControllerIterations": 5}}"#,
        )
        .unwrap();
        assert_eq!(config.orchestration.max_controller_iterations, 5);
        assert_eq!(config.orchestration.request_timeout_secs, 120);
        assert_eq!(config.agent.temperature, 0.7);
    }
}
