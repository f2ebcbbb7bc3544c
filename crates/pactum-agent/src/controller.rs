//! Controller loop — the management agent's conversation and the handoff FSM.
//!
//! `Running` → request a completion with the handoff tools plus the
//! management tools. No tool calls → `Done`. Otherwise every call is paired
//! in order: handoff calls move to `AwaitingSpecialist` and block on that
//! specialist's loop, anything else goes through the management registry.
//! The system prompt is re-rendered from a fresh state snapshot before every
//! request.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use pactum_core::config::OrchestrationConfig;
use pactum_core::state::StateStore;
use pactum_core::types::{Message, ToolCall, ToolDefinition};
use pactum_core::utils::today_iso;

use crate::client::{ModelClient, RunError};
use crate::context::ContextBuilder;
use crate::specialist::{Specialist, SpecialistLoop, SpecialistOutcome, SpecialistReport};
use crate::tools::{
    management, parse_arguments, render_result, CheckerTool, CommunicationTool, ManagementTool,
    TermsTool, ToolRegistry,
};

const AGENT: &str = "management";

// ─────────────────────────────────────────────
// State + report
// ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerState {
    Running,
    AwaitingSpecialist(Specialist),
    Done,
}

/// How the run ended.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunOutcome {
    /// The model answered without tool calls.
    Completed { answer: String },
    /// The controller iteration bound was reached; there is no answer.
    Incomplete { reason: String },
}

/// One specialist session as seen from the controller.
#[derive(Clone, Debug)]
pub struct HandoffRecord {
    pub specialist: Specialist,
    pub call_id: String,
    pub outcome: SpecialistOutcome,
    pub iterations: u32,
}

#[derive(Clone, Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// The controller conversation, system prompt as last rendered.
    pub transcript: Vec<Message>,
    pub handoffs: Vec<HandoffRecord>,
    /// Controller model requests made.
    pub iterations: u32,
}

impl RunReport {
    /// Final answer, if the run completed.
    pub fn answer(&self) -> Option<&str> {
        match &self.outcome {
            RunOutcome::Completed { answer } => Some(answer),
            RunOutcome::Incomplete { .. } => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed { .. })
    }
}

// ─────────────────────────────────────────────
// ControllerLoop
// ─────────────────────────────────────────────

pub struct ControllerLoop {
    client: Arc<ModelClient>,
    state: Arc<StateStore>,
    tools: ToolRegistry<ManagementTool>,
    terms: SpecialistLoop<TermsTool>,
    checker: SpecialistLoop<CheckerTool>,
    communication: SpecialistLoop<CommunicationTool>,
    max_iterations: u32,
}

impl ControllerLoop {
    pub fn new(client: Arc<ModelClient>, state: Arc<StateStore>, orchestration: &OrchestrationConfig) -> Self {
        let tools = ToolRegistry::from_table(|tool| management::handler(tool, &state));
        let specialist_max = orchestration.max_specialist_iterations;

        info!(
            model = client.model(),
            provider = client.provider_name(),
            max_iterations = orchestration.max_controller_iterations,
            max_specialist_iterations = specialist_max,
            "controller initialized"
        );

        Self {
            terms: SpecialistLoop::new(client.clone(), specialist_max),
            checker: SpecialistLoop::new(client.clone(), specialist_max),
            communication: SpecialistLoop::new(client.clone(), specialist_max),
            client,
            state,
            tools,
            max_iterations: orchestration.max_controller_iterations,
        }
    }

    /// Handoff tools followed by the management tools.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        Specialist::ALL
            .iter()
            .map(|s| s.handoff_definition())
            .chain(self.tools.get_definitions())
            .collect()
    }

    /// Tool definitions one specialist sends (its scope plus its return tool).
    pub fn specialist_definitions(&self, specialist: Specialist) -> Vec<ToolDefinition> {
        match specialist {
            Specialist::Terms => self.terms.definitions(),
            Specialist::Checker => self.checker.definitions(),
            Specialist::Communication => self.communication.definitions(),
        }
    }

    /// Drive the controller until it answers or hits its iteration bound.
    ///
    /// Only a model failure (after retries) is an `Err`.
    pub async fn run(&self, task: &str) -> Result<RunReport, RunError> {
        let definitions = self.definitions();
        let mut messages = ContextBuilder::controller_messages(task);
        let mut handoffs = Vec::new();
        let mut state = ControllerState::Running;
        let mut iterations = 0;

        info!(task, "controller run started");

        let outcome = loop {
            if iterations >= self.max_iterations {
                warn!(max = self.max_iterations, "controller reached iteration limit");
                break RunOutcome::Incomplete {
                    reason: format!(
                        "controller reached the iteration limit ({}) without a final answer",
                        self.max_iterations
                    ),
                };
            }
            iterations += 1;

            let snapshot = self.state.snapshot_json().await;
            ContextBuilder::set_system_prompt(
                &mut messages,
                ContextBuilder::controller_prompt(&snapshot, &today_iso()),
            );
            debug!(iteration = iterations, "controller LLM call");

            let response = self.client.complete(AGENT, &messages, &definitions).await?;

            if !response.has_tool_calls() {
                transition(&mut state, ControllerState::Done);
                break RunOutcome::Completed {
                    answer: response.content.unwrap_or_default(),
                };
            }

            let tool_calls = response.tool_calls.clone();
            ContextBuilder::add_assistant_message(&mut messages, response.content, response.tool_calls);

            for call in &tool_calls {
                let result = match Specialist::from_handoff(call.name()) {
                    Some(specialist) => {
                        self.handoff(specialist, call, &mut state, &mut handoffs)
                            .await?
                    }
                    None => self.tools.execute(call).await,
                };
                ContextBuilder::add_tool_result(&mut messages, &call.id, &result);
            }
        };

        info!(
            iterations,
            handoffs = handoffs.len(),
            complete = matches!(outcome, RunOutcome::Completed { .. }),
            "controller run finished"
        );

        Ok(RunReport {
            outcome,
            transcript: messages,
            handoffs,
            iterations,
        })
    }

    /// Run one specialist for a handoff call and return the tool-result content.
    async fn handoff(
        &self,
        specialist: Specialist,
        call: &ToolCall,
        state: &mut ControllerState,
        handoffs: &mut Vec<HandoffRecord>,
    ) -> Result<String, RunError> {
        let args = match parse_arguments(&specialist.handoff_definition(), call.arguments()) {
            Ok(args) => args,
            Err(e) => {
                warn!(specialist = %specialist, error = %e, "malformed handoff, specialist not started");
                return Ok(render_result(Err(e)));
            }
        };
        let opening = serde_json::to_string(&args).unwrap_or_else(|_| call.arguments().to_string());

        transition(state, ControllerState::AwaitingSpecialist(specialist));
        let report: SpecialistReport = match specialist {
            Specialist::Terms => self.terms.run(&opening).await?,
            Specialist::Checker => self.checker.run(&opening).await?,
            Specialist::Communication => self.communication.run(&opening).await?,
        };
        transition(state, ControllerState::Running);

        let result = report.outcome.to_handoff_result(specialist);
        handoffs.push(HandoffRecord {
            specialist,
            call_id: call.id.clone(),
            outcome: report.outcome,
            iterations: report.iterations,
        });
        Ok(render_result(Ok(result)))
    }
}

fn transition(state: &mut ControllerState, next: ControllerState) {
    debug!(from = ?*state, to = ?next, "controller transition");
    *state = next;
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
