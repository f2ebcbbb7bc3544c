//! Tool Registry — per-scope name → handler table and the dispatcher.
//!
//! Dispatch contract for one [`ToolCall`]:
//! 1. resolve the name inside the scope (`UnknownToolError`)
//! 2. parse and validate the argument text (`ArgumentParseError`)
//! 3. run the handler (`ToolExecutionError` on failure)
//! 4. serialize the returned value as the tool-result content
//!
//! Errors never escape as `Err` to the loops' control flow: [`ToolRegistry::execute`]
//! renders them as a structured payload the model can read.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use pactum_core::error::ToolError;
use pactum_core::types::{ToolCall, ToolDefinition};

use super::base::Tool;
use super::scope::ToolScope;

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Handlers for every tool of scope `S`, in `S::ALL` order.
pub struct ToolRegistry<S: ToolScope> {
    tools: Vec<(S, Arc<dyn Tool>)>,
}

impl<S: ToolScope> ToolRegistry<S> {
    /// Build the registry by asking `table` for the handler of every variant.
    pub fn from_table(mut table: impl FnMut(S) -> Arc<dyn Tool>) -> Self {
        let tools: Vec<(S, Arc<dyn Tool>)> = S::ALL.iter().map(|&t| (t, table(t))).collect();
        info!(scope = S::SCOPE, tools = tools.len(), "tool registry built");
        Self { tools }
    }

    /// Look up a handler by model-facing name.
    pub fn get(&self, name: &str) -> Option<(S, &Arc<dyn Tool>)> {
        let tool = S::from_name(name)?;
        self.tools
            .iter()
            .find(|(t, _)| *t == tool)
            .map(|(t, handler)| (*t, handler))
    }

    /// Names of all tools in this scope, in definition order.
    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|(t, _)| t.name()).collect()
    }

    /// The LLM-facing definitions for this scope.
    pub fn get_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|(t, handler)| handler.to_definition(t.name()))
            .collect()
    }

    /// Dispatch one call and return the handler's value or a typed error.
    pub async fn dispatch(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let name = call.name();
        let (tool, handler) = self.get(name).ok_or_else(|| ToolError::UnknownTool {
            tool: name.to_string(),
            scope: S::SCOPE.to_string(),
        })?;

        let params = parse_arguments(&handler.to_definition(tool.name()), call.arguments())?;

        info!(scope = S::SCOPE, tool = name, call_id = %call.id, "executing tool call");
        handler
            .execute(params)
            .await
            .map_err(|e| ToolError::Execution {
                tool: name.to_string(),
                message: e.to_string(),
            })
    }

    /// Dispatch one call and render the outcome as tool-result content.
    pub async fn execute(&self, call: &ToolCall) -> String {
        let outcome = self.dispatch(call).await;
        match &outcome {
            Ok(_) => debug!(scope = S::SCOPE, tool = call.name(), "tool call succeeded"),
            Err(e) => warn!(
                scope = S::SCOPE,
                tool = call.name(),
                kind = e.kind(),
                error = %e,
                "tool call failed"
            ),
        }
        render_result(outcome)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

// ─────────────────────────────────────────────
// Argument parsing
// ─────────────────────────────────────────────

/// Parse raw argument text against a definition.
///
/// Empty text counts as `{}`. The value must be a JSON object holding every
/// field the schema lists as `required`.
pub fn parse_arguments(
    definition: &ToolDefinition,
    raw: &str,
) -> Result<HashMap<String, Value>, ToolError> {
    let tool = definition.function.name.as_str();
    let parse_error = |message: String| ToolError::ArgumentParse {
        tool: tool.to_string(),
        message,
    };

    let raw = raw.trim();
    let value: Value = if raw.is_empty() {
        Value::Object(Default::default())
    } else {
        serde_json::from_str(raw).map_err(|e| parse_error(e.to_string()))?
    };

    let params = match value {
        Value::Object(map) => map,
        other => return Err(parse_error(format!("arguments must be a JSON object, got {other}"))),
    };

    check_field_types(&definition.function.parameters, &params).map_err(parse_error)?;

    let missing: Vec<&str> = definition
        .required_fields()
        .into_iter()
        .filter(|field| !params.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(parse_error(format!(
            "missing required field(s): {}",
            missing.join(", ")
        )));
    }

    Ok(params.into_iter().collect())
}

/// Check present fields against `properties.<field>.type`, and reject unknown
/// fields when the schema sets `additionalProperties: false`.
fn check_field_types(schema: &Value, params: &serde_json::Map<String, Value>) -> Result<(), String> {
    let properties = schema.get("properties").and_then(|p| p.as_object());
    let closed = schema.get("additionalProperties") == Some(&Value::Bool(false));

    for (key, value) in params {
        let Some(expected) = properties.and_then(|p| p.get(key)) else {
            if closed {
                return Err(format!("unexpected field: {key}"));
            }
            continue;
        };
        let Some(kind) = expected.get("type").and_then(|t| t.as_str()) else {
            continue;
        };
        let ok = match kind {
            "string" => value.is_string(),
            "number" => value.is_number(),
            "integer" => value.is_i64() || value.is_u64(),
            "boolean" => value.is_boolean(),
            "object" => value.is_object(),
            "array" => value.is_array(),
            _ => true,
        };
        if !ok {
            return Err(format!("field {key} must be of type {kind}, got {value}"));
        }
    }
    Ok(())
}

/// Serialize a dispatch outcome as tool-result content.
pub fn render_result(outcome: Result<Value, ToolError>) -> String {
    let value = match outcome {
        Ok(value) => value,
        Err(e) => e.to_payload(),
    };
    serde_json::to_string(&value).unwrap_or_else(|e| format!(r#"{{"error":"{e}"}}"#))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum DemoTool {
        Echo,
        Fail,
    }

    impl ToolScope for DemoTool {
        const SCOPE: &'static str = "demo";
        const ALL: &'static [Self] = &[DemoTool::Echo, DemoTool::Fail];

        fn name(self) -> &'static str {
            match self {
                DemoTool::Echo => "echo",
                DemoTool::Fail => "fail",
            }
        }
    }

    /// Minimal test tool.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string", "description": "Text to echo" }
                },
                "required": ["text"]
            })
        }
        async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<Value> {
            let text = params.get("text").and_then(|v| v.as_str()).unwrap_or("(empty)");
            Ok(json!({ "echo": text }))
        }
    }

    /// Tool that always fails.
    struct FailTool;

    #[async_trait]
    impl Tool for FailTool {
        fn description(&self) -> &str {
            "Always fails"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}, "required": []})
        }
        async fn execute(&self, _params: HashMap<String, Value>) -> anyhow::Result<Value> {
            anyhow::bail!("intentional failure")
        }
    }

    fn registry() -> ToolRegistry<DemoTool> {
        ToolRegistry::from_table(|tool| match tool {
            DemoTool::Echo => Arc::new(EchoTool),
            DemoTool::Fail => Arc::new(FailTool),
        })
    }

    #[test]
    fn test_definitions_follow_scope_order() {
        let reg = registry();
        let names: Vec<String> = reg
            .get_definitions()
            .into_iter()
            .map(|d| d.function.name)
            .collect();
        assert_eq!(names, vec!["echo", "fail"]);
        assert_eq!(reg.tool_names(), vec!["echo", "fail"]);
        assert_eq!(reg.len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_success() {
        let reg = registry();
        let call = ToolCall::new("c1", "echo", r#"{"text": "hello"}"#);
        assert_eq!(reg.dispatch(&call).await.unwrap(), json!({"echo": "hello"}));
        assert_eq!(reg.execute(&call).await, r#"{"echo":"hello"}"#);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let reg = registry();
        let call = ToolCall::new("c1", "transferToTermsAgent", r#"{"documentId": 1}"#);
        let err = reg.dispatch(&call).await.unwrap_err();
        assert_eq!(
            err,
            ToolError::UnknownTool {
                tool: "transferToTermsAgent".into(),
                scope: "demo".into()
            }
        );

        let rendered: Value = serde_json::from_str(&reg.execute(&call).await).unwrap();
        assert_eq!(rendered["error"]["kind"], "UnknownToolError");
    }

    #[tokio::test]
    async fn test_unknown_name_wins_over_bad_arguments() {
        let reg = registry();
        let call = ToolCall::new("c1", "nope", "{bad json");
        let err = reg.dispatch(&call).await.unwrap_err();
        assert_eq!(err.kind(), "UnknownToolError");
    }

    #[tokio::test]
    async fn test_malformed_arguments() {
        let reg = registry();
        let call = ToolCall::new("c1", "echo", "{bad json");
        let err = reg.dispatch(&call).await.unwrap_err();
        assert_eq!(err.kind(), "ArgumentParseError");
        assert_eq!(err.tool(), "echo");
    }

    #[tokio::test]
    async fn test_missing_required_field() {
        let reg = registry();
        let call = ToolCall::new("c1", "echo", r#"{"other": 1}"#);
        let err = reg.dispatch(&call).await.unwrap_err();
        assert_eq!(err.kind(), "ArgumentParseError");
        assert!(err.to_string().contains("text"));
    }

    #[tokio::test]
    async fn test_wrong_field_type() {
        let reg = registry();
        let call = ToolCall::new("c1", "echo", r#"{"text": 5}"#);
        let err = reg.dispatch(&call).await.unwrap_err();
        assert_eq!(err.kind(), "ArgumentParseError");
        assert!(err.to_string().contains("must be of type string"));
    }

    #[test]
    fn test_closed_schema_rejects_extra_fields() {
        let def = ToolDefinition::new(
            "termsTransferToManagement",
            "Return",
            json!({
                "type": "object",
                "properties": { "info": { "type": "string" } },
                "required": ["info"],
                "additionalProperties": false
            }),
        );
        assert!(parse_arguments(&def, r#"{"info": "ok"}"#).is_ok());
        let err = parse_arguments(&def, r#"{"info": "ok", "extra": 1}"#).unwrap_err();
        assert!(err.to_string().contains("unexpected field: extra"));
    }

    #[tokio::test]
    async fn test_non_object_arguments() {
        let reg = registry();
        let call = ToolCall::new("c1", "fail", "[1, 2]");
        let err = reg.dispatch(&call).await.unwrap_err();
        assert_eq!(err.kind(), "ArgumentParseError");
    }

    #[tokio::test]
    async fn test_empty_arguments_are_empty_object() {
        let reg = registry();
        // Gets past parsing and reaches the handler.
        let call = ToolCall::new("c1", "fail", "");
        let err = reg.dispatch(&call).await.unwrap_err();
        assert_eq!(err.kind(), "ToolExecutionError");
    }

    #[tokio::test]
    async fn test_execution_error_payload() {
        let reg = registry();
        let call = ToolCall::new("c1", "fail", "{}");
        let rendered: Value = serde_json::from_str(&reg.execute(&call).await).unwrap();
        assert_eq!(rendered["error"]["kind"], "ToolExecutionError");
        assert_eq!(rendered["error"]["tool"], "fail");
        assert!(rendered["error"]["message"]
            .as_str()
            .unwrap()
            .contains("intentional failure"));
    }

    #[test]
    fn test_render_string_value_is_json() {
        assert_eq!(render_result(Ok(json!("done"))), r#""done""#);
    }
}
