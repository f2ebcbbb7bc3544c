//! Tool trait — the interface every tool handler implements — plus param helpers.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use pactum_core::types::ToolDefinition;

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// A tool handler.
///
/// The name lives on the scope variant the handler is registered under
/// (see [`super::scope::ToolScope`]); the handler supplies the schema and
/// the behaviour.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Human-readable description shown to the LLM.
    fn description(&self) -> &str;

    /// JSON Schema describing the parameters.
    ///
    /// Must be `{"type": "object", "properties": {...}, "required": [...]}`.
    fn parameters(&self) -> Value;

    /// Whether the definition is sent with `strict: true`.
    fn strict(&self) -> bool {
        false
    }

    /// Execute the tool with already-parsed, already-validated arguments.
    ///
    /// The returned value is serialized as the tool-result content. On
    /// failure return an `Err`; the registry turns it into a structured
    /// error payload for the LLM.
    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<Value>;

    /// Build the `ToolDefinition` sent to the LLM.
    fn to_definition(&self, name: &str) -> ToolDefinition {
        let def = ToolDefinition::new(name, self.description(), self.parameters());
        if self.strict() {
            def.strict()
        } else {
            def
        }
    }
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Extract a required `String` param, returning a user-friendly error.
pub fn require_string(params: &HashMap<String, Value>, key: &str) -> anyhow::Result<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {key}"))
}

/// Extract a required non-negative integer param.
///
/// Schemas declare ids as `number`, so integral floats like `101.0` are
/// accepted too.
pub fn require_u64(params: &HashMap<String, Value>, key: &str) -> anyhow::Result<u64> {
    let value = params
        .get(key)
        .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {key}"))?;
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        })
        .ok_or_else(|| anyhow::anyhow!("Parameter {key} must be a non-negative integer, got {value}"))
}

/// Extract a required JSON object param.
pub fn require_object(params: &HashMap<String, Value>, key: &str) -> anyhow::Result<Value> {
    match params.get(key) {
        Some(v @ Value::Object(_)) => Ok(v.clone()),
        Some(other) => anyhow::bail!("Parameter {key} must be an object, got {other}"),
        None => anyhow::bail!("Missing required parameter: {key}"),
    }
}
