//! Specialist agent loop — one bounded sub-conversation per handoff.
//!
//! Generic over its [`SpecialistScope`]: the scope fixes which specialist
//! this is, which tools it sees and which return tool ends it. The loop
//! exits when the model calls the return tool (`Returned`), answers without
//! tool calls, or runs out of iterations (both `Abnormal`).

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use pactum_core::types::{Message, ToolCall, ToolDefinition};

use crate::client::{ModelClient, RunError};
use crate::context::ContextBuilder;
use crate::tools::{
    checker, communication, parse_arguments, render_result, terms, CheckerTool,
    CommunicationTool, TermsTool, Tool, ToolRegistry, ToolScope,
};

// ─────────────────────────────────────────────
// Specialist identity
// ─────────────────────────────────────────────

/// The three specialists the controller can hand off to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Specialist {
    Terms,
    Checker,
    Communication,
}

impl Specialist {
    pub const ALL: [Specialist; 3] = [
        Specialist::Terms,
        Specialist::Checker,
        Specialist::Communication,
    ];

    /// Agent label used in logs and handoff results.
    pub fn name(self) -> &'static str {
        match self {
            Specialist::Terms => "terms",
            Specialist::Checker => "checker",
            Specialist::Communication => "communication",
        }
    }

    /// Controller-side tool that starts this specialist.
    pub fn handoff_tool(self) -> &'static str {
        match self {
            Specialist::Terms => "transferToTermsAgent",
            Specialist::Checker => "transferToCheckerAgent",
            Specialist::Communication => "transferToCommunicationAgent",
        }
    }

    /// Specialist-side tool that hands control back.
    pub fn return_tool(self) -> &'static str {
        match self {
            Specialist::Terms => "termsTransferToManagement",
            Specialist::Checker => "checkerTransferToManagement",
            Specialist::Communication => "commTransferToManagement",
        }
    }

    pub fn responsibility(self) -> &'static str {
        match self {
            Specialist::Terms => "contract periods, start and end dates, and cancellation terms",
            Specialist::Checker => "formatting, spelling, guidelines and feedback",
            Specialist::Communication => "signing, email, calls and negotiation",
        }
    }

    /// Resolve a handoff tool name.
    pub fn from_handoff(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.handoff_tool() == name)
    }

    pub fn handoff_definition(self) -> ToolDefinition {
        ToolDefinition::new(
            self.handoff_tool(),
            format!(
                "Hand the document to the {} agent ({}). Blocks until it returns.",
                self.name(),
                self.responsibility()
            ),
            json!({
                "type": "object",
                "properties": {
                    "documentId": { "type": "number", "description": "ID of the document" }
                },
                "required": ["documentId"],
                "additionalProperties": false
            }),
        )
        .strict()
    }

    pub fn return_definition(self) -> ToolDefinition {
        ToolDefinition::new(
            self.return_tool(),
            format!("Transfer control back to management with the {} results.", self.name()),
            json!({
                "type": "object",
                "properties": {
                    "info": { "type": "string", "description": "Information to pass back" }
                },
                "required": ["info"],
                "additionalProperties": false
            }),
        )
        .strict()
    }
}

impl fmt::Display for Specialist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A tool scope owned by a specialist.
pub trait SpecialistScope: ToolScope {
    const SPECIALIST: Specialist;

    /// Handler for one tool of the scope.
    fn handler(self) -> Arc<dyn Tool>;
}

impl SpecialistScope for TermsTool {
    const SPECIALIST: Specialist = Specialist::Terms;

    fn handler(self) -> Arc<dyn Tool> {
        terms::handler(self)
    }
}

impl SpecialistScope for CheckerTool {
    const SPECIALIST: Specialist = Specialist::Checker;

    fn handler(self) -> Arc<dyn Tool> {
        checker::handler(self)
    }
}

impl SpecialistScope for CommunicationTool {
    const SPECIALIST: Specialist = Specialist::Communication;

    fn handler(self) -> Arc<dyn Tool> {
        communication::handler(self)
    }
}

// ─────────────────────────────────────────────
// Outcome types
// ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialistState {
    Running,
    Returned,
    Abnormal,
}

/// Why a specialist stopped without calling its return tool.
#[derive(Clone, Debug, PartialEq)]
pub enum AbnormalReason {
    /// The model answered with no tool calls.
    NoToolCalls { content: Option<String> },
    /// The iteration bound was reached.
    IterationLimit { max: u32 },
}

impl fmt::Display for AbnormalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbnormalReason::NoToolCalls { content: Some(text) } => {
                write!(f, "ended without calling its return tool: {text}")
            }
            AbnormalReason::NoToolCalls { content: None } => {
                f.write_str("ended without calling its return tool")
            }
            AbnormalReason::IterationLimit { max } => {
                write!(f, "reached the iteration limit ({max}) without returning")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SpecialistOutcome {
    /// Arguments of the return call, e.g. `{"info": "..."}`.
    Returned { payload: Value },
    Abnormal(AbnormalReason),
}

impl SpecialistOutcome {
    pub fn state(&self) -> SpecialistState {
        match self {
            SpecialistOutcome::Returned { .. } => SpecialistState::Returned,
            SpecialistOutcome::Abnormal(_) => SpecialistState::Abnormal,
        }
    }

    /// Tool-result payload the controller appends for the handoff call.
    pub fn to_handoff_result(&self, specialist: Specialist) -> Value {
        match self {
            SpecialistOutcome::Returned { payload } => json!({
                "agent": specialist.name(),
                "status": "completed",
                "payload": payload,
            }),
            SpecialistOutcome::Abnormal(reason) => json!({
                "agent": specialist.name(),
                "status": "incomplete",
                "reason": reason.to_string(),
            }),
        }
    }
}

/// Result of one specialist session.
#[derive(Clone, Debug)]
pub struct SpecialistReport {
    pub specialist: Specialist,
    pub outcome: SpecialistOutcome,
    /// Model requests made.
    pub iterations: u32,
    /// The session's conversation, discarded by the controller.
    pub transcript: Vec<Message>,
}

// ─────────────────────────────────────────────
// SpecialistLoop
// ─────────────────────────────────────────────

pub struct SpecialistLoop<S: SpecialistScope> {
    client: Arc<ModelClient>,
    tools: ToolRegistry<S>,
    max_iterations: u32,
}

impl<S: SpecialistScope> SpecialistLoop<S> {
    pub fn new(client: Arc<ModelClient>, max_iterations: u32) -> Self {
        Self {
            client,
            tools: ToolRegistry::from_table(S::handler),
            max_iterations,
        }
    }

    pub fn specialist(&self) -> Specialist {
        S::SPECIALIST
    }

    /// Scoped tools plus the return tool.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs = self.tools.get_definitions();
        defs.push(S::SPECIALIST.return_definition());
        defs
    }

    /// Run one session to completion. `handoff` becomes the opening user message.
    ///
    /// Only a model failure is an `Err`; abnormal exits are reported in the outcome.
    pub async fn run(&self, handoff: &str) -> Result<SpecialistReport, RunError> {
        let specialist = S::SPECIALIST;
        let agent = specialist.name();
        let definitions = self.definitions();
        let return_definition = specialist.return_definition();

        let prompt = ContextBuilder::specialist_prompt(specialist, &self.tools.tool_names());
        let mut messages = vec![Message::system(prompt), Message::user(handoff)];
        let mut iterations = 0;

        info!(agent, max_iterations = self.max_iterations, "specialist started");

        let outcome = loop {
            if iterations >= self.max_iterations {
                break SpecialistOutcome::Abnormal(AbnormalReason::IterationLimit {
                    max: self.max_iterations,
                });
            }
            iterations += 1;
            debug!(agent, iteration = iterations, "specialist LLM call");

            let response = self.client.complete(agent, &messages, &definitions).await?;

            if !response.has_tool_calls() {
                break SpecialistOutcome::Abnormal(AbnormalReason::NoToolCalls {
                    content: response.content,
                });
            }

            let tool_calls = response.tool_calls.clone();
            ContextBuilder::add_assistant_message(&mut messages, response.content, response.tool_calls);

            if let Some(payload) = self
                .dispatch_calls(&tool_calls, &return_definition, &mut messages)
                .await
            {
                break SpecialistOutcome::Returned { payload };
            }
        };

        let state = outcome.state();
        match &outcome {
            SpecialistOutcome::Returned { .. } => {
                info!(agent, from = ?SpecialistState::Running, to = ?state, iterations, "specialist returned")
            }
            SpecialistOutcome::Abnormal(reason) => {
                warn!(agent, from = ?SpecialistState::Running, to = ?state, iterations, reason = %reason, "specialist ended abnormally")
            }
        }

        Ok(SpecialistReport {
            specialist,
            outcome,
            iterations,
            transcript: messages,
        })
    }

    /// Pair every call in order. Stops at a valid return call and yields its payload.
    async fn dispatch_calls(
        &self,
        tool_calls: &[ToolCall],
        return_definition: &ToolDefinition,
        messages: &mut Vec<Message>,
    ) -> Option<Value> {
        let agent = S::SPECIALIST.name();

        for (index, call) in tool_calls.iter().enumerate() {
            if call.name() != return_definition.function.name {
                let result = self.tools.execute(call).await;
                ContextBuilder::add_tool_result(messages, &call.id, &result);
                continue;
            }

            match parse_arguments(return_definition, call.arguments()) {
                Ok(args) => {
                    let skipped = tool_calls.len() - index - 1;
                    if skipped > 0 {
                        warn!(agent, skipped, "calls after the return call were not executed");
                    }
                    ContextBuilder::add_tool_result(messages, &call.id, r#"{"status":"returned"}"#);
                    return Some(Value::Object(args.into_iter().collect()));
                }
                Err(e) => {
                    warn!(agent, error = %e, "invalid return call, continuing");
                    ContextBuilder::add_tool_result(messages, &call.id, &render_result(Err(e)));
                }
            }
        }
        None
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pactum_core::error::ModelRequestError;
    use pactum_core::types::LlmResponse;
    use pactum_providers::traits::{LlmProvider, LlmRequestConfig};
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Replays canned responses in order and records every request.
    struct ScriptedProvider {
        responses: Mutex<Vec<LlmResponse>>,
        requests: Mutex<Vec<(Vec<Message>, Vec<String>)>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<LlmResponse>) -> Self {
            Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<(Vec<Message>, Vec<String>)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        async fn chat(
            &self,
            messages: &[Message],
            tools: Option<&[ToolDefinition]>,
            _model: &str,
            _config: &LlmRequestConfig,
        ) -> Result<LlmResponse, ModelRequestError> {
            let names = tools
                .unwrap_or_default()
                .iter()
                .map(|t| t.function.name.clone())
                .collect();
            self.requests.lock().unwrap().push((messages.to_vec(), names));

            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(LlmResponse::text("(no more responses)"))
            } else {
                Ok(responses.remove(0))
            }
        }

        fn default_model(&self) -> &str {
            "scripted-model"
        }

        fn display_name(&self) -> &str {
            "Scripted"
        }
    }

    fn calls(calls: &[(&str, &str, &str)]) -> LlmResponse {
        LlmResponse::with_tool_calls(
            calls
                .iter()
                .map(|(id, name, args)| ToolCall::new(*id, *name, *args))
                .collect(),
        )
    }

    fn terms_loop(provider: Arc<ScriptedProvider>, max: u32) -> SpecialistLoop<TermsTool> {
        SpecialistLoop::new(Arc::new(ModelClient::new(provider, None)), max)
    }

    #[test]
    fn test_handoff_names_resolve() {
        for s in Specialist::ALL {
            assert_eq!(Specialist::from_handoff(s.handoff_tool()), Some(s));
            assert_eq!(s.handoff_definition().function.strict, Some(true));
            assert_eq!(s.return_definition().required_fields(), vec!["info"]);
        }
        assert_eq!(Specialist::from_handoff("termsTransferToManagement"), None);
    }

    #[test]
    fn test_definitions_are_scoped() {
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let names: Vec<String> = terms_loop(provider, 5)
            .definitions()
            .into_iter()
            .map(|d| d.function.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "loadContract",
                "checkPeriods",
                "extractDates",
                "findCancellationSection",
                "extractCancellationInfo",
                "termsTransferToManagement",
            ]
        );
    }

    #[tokio::test]
    async fn test_returns_payload() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            calls(&[("c1", "loadContract", r#"{"documentId": 101}"#)]),
            calls(&[("c2", "termsTransferToManagement", r#"{"info": "30 days notice"}"#)]),
        ]));
        let report = terms_loop(provider.clone(), 25)
            .run(r#"{"documentId":101}"#)
            .await
            .unwrap();

        assert_eq!(
            report.outcome,
            SpecialistOutcome::Returned {
                payload: json!({"info": "30 days notice"})
            }
        );
        assert_eq!(report.iterations, 2);

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].0[1], Message::user(r#"{"documentId":101}"#));
        assert!(requests[0].1.contains(&"termsTransferToManagement".to_string()));
        assert!(!requests[0].1.contains(&"transferToTermsAgent".to_string()));
    }

    #[tokio::test]
    async fn test_every_call_paired_before_next_request() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            calls(&[
                ("a", "loadContract", r#"{"documentId": 101}"#),
                ("b", "checkSpelling", "{}"),
                ("c", "extractDates", "{bad json"),
            ]),
            calls(&[("d", "termsTransferToManagement", r#"{"info": "ok"}"#)]),
        ]));
        terms_loop(provider.clone(), 25).run("{}").await.unwrap();

        let second_request = &provider.requests()[1].0;
        let assistant_count = second_request
            .iter()
            .filter(|m| !m.tool_calls().is_empty())
            .count();
        assert_eq!(assistant_count, 1);

        let results: Vec<(&str, &str)> = second_request
            .iter()
            .filter_map(|m| match m {
                Message::Tool { tool_call_id, content } => Some((tool_call_id.as_str(), content.as_str())),
                _ => None,
            })
            .collect();
        let ids: Vec<&str> = results.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(results[1].1.contains("UnknownToolError"));
        assert!(results[2].1.contains("ArgumentParseError"));
    }

    #[tokio::test]
    async fn test_no_tool_calls_is_abnormal() {
        let provider = Arc::new(ScriptedProvider::new(vec![LlmResponse::text("I am done.")]));
        let report = terms_loop(provider, 25).run("{}").await.unwrap();
        assert_eq!(
            report.outcome,
            SpecialistOutcome::Abnormal(AbnormalReason::NoToolCalls {
                content: Some("I am done.".into())
            })
        );
        assert_eq!(report.outcome.state(), SpecialistState::Abnormal);
    }

    #[tokio::test]
    async fn test_iteration_limit_is_abnormal() {
        let looping: Vec<LlmResponse> = (0..40)
            .map(|i| {
                LlmResponse::with_tool_calls(vec![ToolCall::new(
                    format!("c{i}"),
                    "loadContract",
                    r#"{"documentId": 101}"#,
                )])
            })
            .collect();
        let provider = Arc::new(ScriptedProvider::new(looping));
        let report = terms_loop(provider.clone(), 25).run("{}").await.unwrap();

        assert_eq!(
            report.outcome,
            SpecialistOutcome::Abnormal(AbnormalReason::IterationLimit { max: 25 })
        );
        assert_eq!(report.iterations, 25);
        assert_eq!(provider.requests().len(), 25);

        let result = report.outcome.to_handoff_result(Specialist::Terms);
        assert_eq!(result["status"], "incomplete");
        assert!(result["reason"].as_str().unwrap().contains("iteration limit (25)"));
    }

    #[tokio::test]
    async fn test_invalid_return_call_lets_model_retry() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            calls(&[("r1", "termsTransferToManagement", r#"{"info": 42}"#)]),
            calls(&[("r2", "termsTransferToManagement", r#"{"info": "fixed"}"#)]),
        ]));
        let report = terms_loop(provider.clone(), 25).run("{}").await.unwrap();

        assert_eq!(
            report.outcome,
            SpecialistOutcome::Returned {
                payload: json!({"info": "fixed"})
            }
        );
        let second = &provider.requests()[1].0;
        let Some(Message::Tool { tool_call_id, content }) = second.last() else {
            panic!("expected tool result, got {:?}", second.last());
        };
        assert_eq!(tool_call_id, "r1");
        assert!(content.contains("ArgumentParseError"));
    }

    #[tokio::test]
    async fn test_calls_after_return_are_not_executed() {
        let provider = Arc::new(ScriptedProvider::new(vec![calls(&[
            ("a", "extractDates", r#"{"contractText": "from 2025-01-01 to 2026-01-01"}"#),
            ("b", "termsTransferToManagement", r#"{"info": "dates found"}"#),
            ("c", "loadContract", r#"{"documentId": 101}"#),
        ])]));
        let report = terms_loop(provider, 25).run("{}").await.unwrap();

        let paired: HashSet<&str> = report
            .transcript
            .iter()
            .filter_map(|m| match m {
                Message::Tool { tool_call_id, .. } => Some(tool_call_id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(paired, HashSet::from(["a", "b"]));
        assert_eq!(report.iterations, 1);
    }

    #[test]
    fn test_completed_handoff_result_shape() {
        let outcome = SpecialistOutcome::Returned {
            payload: json!({"info": "ok"}),
        };
        assert_eq!(
            outcome.to_handoff_result(Specialist::Checker),
            json!({"agent": "checker", "status": "completed", "payload": {"info": "ok"}})
        );
    }
}
