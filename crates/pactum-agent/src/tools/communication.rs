//! Communication tools — signing, email, calls and negotiation material.
//!
//! Nothing here reaches an external service: signing and email only report
//! what would be sent.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use pactum_core::utils::preview;

use super::base::{require_string, require_u64, Tool};
use super::documents::load_document;
use super::scope::ToolScope;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommunicationTool {
    LoadDocumentForComms,
    Signing,
    AccessSigningSolutions,
    AccessEmail,
    EmailAccess,
    ProjectInfo,
    AccessCalls,
    AccessNegotiatingStrategies,
}

impl ToolScope for CommunicationTool {
    const SCOPE: &'static str = "communication";
    const ALL: &'static [Self] = &[
        CommunicationTool::LoadDocumentForComms,
        CommunicationTool::Signing,
        CommunicationTool::AccessSigningSolutions,
        CommunicationTool::AccessEmail,
        CommunicationTool::EmailAccess,
        CommunicationTool::ProjectInfo,
        CommunicationTool::AccessCalls,
        CommunicationTool::AccessNegotiatingStrategies,
    ];

    fn name(self) -> &'static str {
        match self {
            CommunicationTool::LoadDocumentForComms => "loadDocumentForComms",
            CommunicationTool::Signing => "signing",
            CommunicationTool::AccessSigningSolutions => "accessSigningSolutions",
            CommunicationTool::AccessEmail => "accessEmail",
            CommunicationTool::EmailAccess => "emailAccess",
            CommunicationTool::ProjectInfo => "projectInfo",
            CommunicationTool::AccessCalls => "accessCalls",
            CommunicationTool::AccessNegotiatingStrategies => "accessNegotiatingStrategies",
        }
    }
}

/// Handler table for the communication scope.
pub fn handler(tool: CommunicationTool) -> Arc<dyn Tool> {
    match tool {
        CommunicationTool::LoadDocumentForComms => Arc::new(LoadDocumentForCommsTool),
        CommunicationTool::Signing => Arc::new(SigningTool),
        CommunicationTool::AccessSigningSolutions => Arc::new(StaticTool {
            description: "Get the available e-signing solutions.",
            value: json!(["DocuSign", "AdobeSign"]),
        }),
        CommunicationTool::AccessEmail => Arc::new(StaticTool {
            description: "Access email client information.",
            value: json!({
                "emailClient": "Outbox",
                "emailAddress": "contracts@example.com"
            }),
        }),
        CommunicationTool::EmailAccess => Arc::new(EmailAccessTool),
        CommunicationTool::ProjectInfo => Arc::new(StaticTool {
            description: "Get project information.",
            value: json!({"projectName": "Demo Project", "manager": "Alice"}),
        }),
        CommunicationTool::AccessCalls => Arc::new(StaticTool {
            description: "Get the available call platforms.",
            value: json!(["Zoom", "Teams", "Google Meet"]),
        }),
        CommunicationTool::AccessNegotiatingStrategies => Arc::new(StaticTool {
            description: "Get the available negotiating strategies.",
            value: json!([
                "Strategy A: Offer discount",
                "Strategy B: Extend contract term"
            ]),
        }),
    }
}

// ─────────────────────────────────────────────
// StaticTool
// ─────────────────────────────────────────────

/// Parameterless lookup returning a fixed value.
pub struct StaticTool {
    description: &'static str,
    value: Value,
}

#[async_trait]
impl Tool for StaticTool {
    fn description(&self) -> &str {
        self.description
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}, "required": []})
    }

    async fn execute(&self, _params: HashMap<String, Value>) -> anyhow::Result<Value> {
        Ok(self.value.clone())
    }
}

// ─────────────────────────────────────────────
// LoadDocumentForCommsTool
// ─────────────────────────────────────────────

pub struct LoadDocumentForCommsTool;

#[async_trait]
impl Tool for LoadDocumentForCommsTool {
    fn description(&self) -> &str {
        "Load a contract document for the communication agent."
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
// SigningTool
// ─────────────────────────────────────────────

/// Prepares a contract for e-signing: one signature field per signature line.
pub struct SigningTool;

#[async_trait]
impl Tool for SigningTool {
    fn description(&self) -> &str {
        "Prepare a contract document for e-signing."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "contractText": { "type": "string" }
            },
            "required": ["contractText"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<Value> {
        let text = require_string(&params, "contractText")?;
        let signers: Vec<&str> = text
            .lines()
            .filter(|line| line.contains("____"))
            .filter_map(|line| line.split_once(':').map(|(party, _)| party.trim()))
            .collect();
        if signers.is_empty() {
            anyhow::bail!("Contract has no signature lines to prepare");
        }
        Ok(json!({
            "prepared": true,
            "signers": signers,
        }))
    }
}

// ─────────────────────────────────────────────
// EmailAccessTool
// ─────────────────────────────────────────────

pub struct EmailAccessTool;

#[async_trait]
impl Tool for EmailAccessTool {
    fn description(&self) -> &str {
        "Send an email with contract information."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "emailInfo": { "type": "string", "description": "Recipients and body of the email" }
            },
            "required": ["emailInfo"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<Value> {
        let info = require_string(&params, "emailInfo")?;
        let snippet = preview(&info, 80);
        info!(preview = %snippet, "email queued");
        Ok(json!({ "queued": true, "preview": snippet }))
    }
}
