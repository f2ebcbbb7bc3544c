//! Management tools — the controller's own scope.
//!
//! `updateState` is the only tool anywhere that writes the [`StateStore`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use pactum_core::state::StateStore;

use super::base::{require_object, require_u64, Tool};
use super::documents::load_document;
use super::scope::ToolScope;

/// Tools the controller may call directly (handoffs are not in here).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ManagementTool {
    LoadDocumentForMgmt,
    AccessState,
    UpdateState,
}

impl ToolScope for ManagementTool {
    const SCOPE: &'static str = "management";
    const ALL: &'static [Self] = &[
        ManagementTool::LoadDocumentForMgmt,
        ManagementTool::AccessState,
        ManagementTool::UpdateState,
    ];

    fn name(self) -> &'static str {
        match self {
            ManagementTool::LoadDocumentForMgmt => "loadDocumentForMgmt",
            ManagementTool::AccessState => "accessState",
            ManagementTool::UpdateState => "updateState",
        }
    }
}

/// Handler table for the management scope.
pub fn handler(tool: ManagementTool, state: &Arc<StateStore>) -> Arc<dyn Tool> {
    match tool {
        ManagementTool::LoadDocumentForMgmt => Arc::new(LoadDocumentForMgmtTool),
        ManagementTool::AccessState => Arc::new(AccessStateTool::new(state.clone())),
        ManagementTool::UpdateState => Arc::new(UpdateStateTool::new(state.clone())),
    }
}

// ─────────────────────────────────────────────
// LoadDocumentForMgmtTool
// ─────────────────────────────────────────────

/// Loads a contract's full text for the controller.
pub struct LoadDocumentForMgmtTool;

#[async_trait]
impl Tool for LoadDocumentForMgmtTool {
    fn description(&self) -> &str {
        "Load the full text of a contract document for the management agent."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "documentId": { "type": "number", "description": "ID of the document" }
            },
            "required": ["documentId"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<Value> {
        let id = require_u64(&params, "documentId")?;
        Ok(Value::String(load_document(id)?.to_string()))
    }
}

// ─────────────────────────────────────────────
// AccessStateTool
// ─────────────────────────────────────────────

/// Returns the current shared state.
pub struct AccessStateTool {
    state: Arc<StateStore>,
}

impl AccessStateTool {
    pub fn new(state: Arc<StateStore>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Tool for AccessStateTool {
    fn description(&self) -> &str {
        "Access the current contract-processing state."
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}, "required": []})
    }

    async fn execute(&self, _params: HashMap<String, Value>) -> anyhow::Result<Value> {
        Ok(self.state.snapshot_json().await)
    }
}

// ─────────────────────────────────────────────
// UpdateStateTool
// ─────────────────────────────────────────────

/// Shallow-merges a partial object into the shared state.
pub struct UpdateStateTool {
    state: Arc<StateStore>,
}

impl UpdateStateTool {
    pub fn new(state: Arc<StateStore>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Tool for UpdateStateTool {
    fn description(&self) -> &str {
        "Merge new values into the contract-processing state. Each top-level key \
         you send replaces the stored value completely, so send the whole \
         `contract` object including fields you are not changing."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "newState": {
                    "type": "object",
                    "description": "New state to merge",
                    "properties": {
                        "contract": { "type": "object" }
                    },
                    "required": []
                }
            },
            "required": ["newState"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<Value> {
        let partial = require_object(&params, "newState")?;
        let replaced = self.state.merge(partial).await?;
        info!(keys = ?replaced, "state updated by management");
        Ok(json!({
            "updated": replaced,
            "state": self.state.snapshot_json().await,
        }))
    }
}
