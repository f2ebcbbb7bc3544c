//! Context builder — system prompts and conversation bookkeeping.
//!
//! The controller prompt is re-rendered before every request from a fresh
//! state snapshot; specialist prompts are fixed per specialist.

use serde_json::Value;

use pactum_core::types::{Message, ToolCall};

use crate::specialist::Specialist;

const CONTROLLER_PROMPT: &str = "\
You are the MANAGEMENT agent, orchestrating the processing of a contract from start to finish.
Today's date is {today}.

Hand work to a specialist with one of these handoff tools, then wait until it returns:
{handoffs}

You also have your own tools: loadDocumentForMgmt, accessState and updateState.
After every specialist returns, record its results with updateState. updateState replaces
each top-level key you send, so always send the complete `contract` object.

When the contract is fully processed, reply with a final answer and no tool calls.

The current state is:
{state}";

/// Builds prompts and keeps assistant/tool-result pairing in one place.
pub struct ContextBuilder;

impl ContextBuilder {
    /// Controller system prompt for the given state snapshot.
    pub fn controller_prompt(state: &Value, today: &str) -> String {
        let handoffs: Vec<String> = Specialist::ALL
            .iter()
            .map(|s| format!(" - {}: {}", s.handoff_tool(), s.responsibility()))
            .collect();
        let state = serde_json::to_string_pretty(state).unwrap_or_else(|_| state.to_string());

        CONTROLLER_PROMPT
            .replace("{today}", today)
            .replace("{handoffs}", &handoffs.join("\n"))
            .replace("{state}", &state)
    }

    /// Fixed system prompt for a specialist.
    pub fn specialist_prompt(specialist: Specialist, tool_names: &[&str]) -> String {
        format!(
            "You are the {role} agent. You handle {responsibility}.\n\
             Your tools: {tools}.\n\
             The management agent's handoff arrives as the first user message.\n\
             When you are done, call \"{ret}\" with a summary of your results in `info`, and stop.",
            role = specialist.name().to_uppercase(),
            responsibility = specialist.responsibility(),
            tools = tool_names.join(", "),
            ret = specialist.return_tool(),
        )
    }

    /// Initial controller conversation: placeholder system slot + task.
    pub fn controller_messages(task: &str) -> Vec<Message> {
        vec![Message::system(""), Message::user(task)]
    }

    /// Replace the system message (index 0) in place.
    pub fn set_system_prompt(messages: &mut Vec<Message>, prompt: String) {
        match messages.first_mut() {
            Some(first @ Message::System { .. }) => *first = Message::system(prompt),
            _ => messages.insert(0, Message::system(prompt)),
        }
    }

    /// Append an assistant message exactly once, before any of its results.
    pub fn add_assistant_message(
        messages: &mut Vec<Message>,
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
    ) {
        if tool_calls.is_empty() {
            if let Some(text) = content {
                messages.push(Message::assistant(text));
            }
        } else {
            messages.push(Message::assistant_tool_calls(content, tool_calls));
        }
    }

    /// Append the result paired to `tool_call_id`.
    pub fn add_tool_result(messages: &mut Vec<Message>, tool_call_id: &str, result: &str) {
        messages.push(Message::tool_result(tool_call_id, result));
    }
}
