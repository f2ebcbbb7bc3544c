//! Error taxonomy shared across the workspace.
//!
//! Tool errors are recoverable: the loops turn them into a structured
//! tool-result payload the model can read and react to. Model request errors
//! are fatal for a run once retries are exhausted.

use serde_json::{json, Value};
use thiserror::Error;

/// A tool call that could not be served.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ToolError {
    /// Argument text is not valid JSON, or fails the tool's schema.
    #[error("invalid arguments for {tool}: {message}")]
    ArgumentParse { tool: String, message: String },

    /// The name is not part of the active scope.
    #[error("unknown tool '{tool}' in scope {scope}")]
    UnknownTool { tool: String, scope: String },

    /// The handler ran and failed.
    #[error("{tool} failed: {message}")]
    Execution { tool: String, message: String },
}

impl ToolError {
    /// Stable kind label exposed to the model.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::ArgumentParse { .. } => "ArgumentParseError",
            ToolError::UnknownTool { .. } => "UnknownToolError",
            ToolError::Execution { .. } => "ToolExecutionError",
        }
    }

    /// Name of the tool the error refers to.
    pub fn tool(&self) -> &str {
        match self {
            ToolError::ArgumentParse { tool, .. }
            | ToolError::UnknownTool { tool, .. }
            | ToolError::Execution { tool, .. } => tool,
        }
    }

    /// Structured payload appended as the tool-result content.
    pub fn to_payload(&self) -> Value {
        json!({
            "error": {
                "kind": self.kind(),
                "tool": self.tool(),
                "message": self.to_string(),
            }
        })
    }
}

/// Failure of a single model request.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelRequestError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode provider response: {0}")]
    Decode(String),

    #[error("request timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// Rejected state mutation. The store is left untouched.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StateError {
    #[error("state update must be a JSON object, got {0}")]
    NotAnObject(String),

    #[error("state update does not fit the state shape: {0}")]
    Shape(String),
}
