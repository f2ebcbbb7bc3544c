//! Checker tools — formatting, spelling, guidelines and feedback.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use super::base::{require_string, require_u64, Tool};
use super::documents::load_document;
use super::scope::ToolScope;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckerTool {
    LoadDocumentForChecker,
    LoadFormattingRules,
    CheckFormatting,
    CheckSpelling,
    LoadGuidelines,
    ApplyGuidelines,
    GiveFeedbackToEnvironment,
}

impl ToolScope for CheckerTool {
    const SCOPE: &'static str = "checker";
    const ALL: &'static [Self] = &[
        CheckerTool::LoadDocumentForChecker,
        CheckerTool::LoadFormattingRules,
        CheckerTool::CheckFormatting,
        CheckerTool::CheckSpelling,
        CheckerTool::LoadGuidelines,
        CheckerTool::ApplyGuidelines,
        CheckerTool::GiveFeedbackToEnvironment,
    ];

    fn name(self) -> &'static str {
        match self {
            CheckerTool::LoadDocumentForChecker => "loadDocumentForChecker",
            CheckerTool::LoadFormattingRules => "loadFormattingRules",
            CheckerTool::CheckFormatting => "checkFormatting",
            CheckerTool::CheckSpelling => "checkSpelling",
            CheckerTool::LoadGuidelines => "loadGuidelines",
            CheckerTool::ApplyGuidelines => "applyGuidelines",
            CheckerTool::GiveFeedbackToEnvironment => "giveFeedbackToEnvironment",
        }
    }
}

/// Handler table for the checker scope.
pub fn handler(tool: CheckerTool) -> Arc<dyn Tool> {
    match tool {
        CheckerTool::LoadDocumentForChecker => Arc::new(LoadDocumentForCheckerTool),
        CheckerTool::LoadFormattingRules => Arc::new(LoadFormattingRulesTool),
        CheckerTool::CheckFormatting => Arc::new(CheckFormattingTool),
        CheckerTool::CheckSpelling => Arc::new(CheckSpellingTool),
        CheckerTool::LoadGuidelines => Arc::new(LoadGuidelinesTool),
        CheckerTool::ApplyGuidelines => Arc::new(ApplyGuidelinesTool),
        CheckerTool::GiveFeedbackToEnvironment => Arc::new(GiveFeedbackTool),
    }
}

const FORMATTING_RULES: &str = "\
1. The first line is a title of the form 'Contract #<id>: <title>'.
2. Clauses are numbered '1.', '2.', ... in order.
3. The contract ends with a signature block containing a line per party.";

const GUIDELINES: &str = "\
- The contract must contain a signature line for every party.
- The contract must contain a standard disclaimer clause.
- Notice periods must be stated in days.";

/// Common misspellings and their corrections.
const MISSPELLINGS: &[(&str, &str)] = &[
    ("recieve", "receive"),
    ("seperate", "separate"),
    ("occured", "occurred"),
    ("untill", "until"),
    ("agreeement", "agreement"),
    ("liase", "liaise"),
];

// ─────────────────────────────────────────────
// Document + static material
// ─────────────────────────────────────────────

pub struct LoadDocumentForCheckerTool;

#[async_trait]
impl Tool for LoadDocumentForCheckerTool {
    fn description(&self) -> &str {
        "Load a contract document for the checker agent to process."
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

pub struct LoadFormattingRulesTool;

#[async_trait]
impl Tool for LoadFormattingRulesTool {
    fn description(&self) -> &str {
        "Load the formatting rules used for contract checking."
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}, "required": []})
    }

    async fn execute(&self, _params: HashMap<String, Value>) -> anyhow::Result<Value> {
        Ok(Value::String(FORMATTING_RULES.to_string()))
    }
}

pub struct LoadGuidelinesTool;

#[async_trait]
impl Tool for LoadGuidelinesTool {
    fn description(&self) -> &str {
        "Load the contract guidelines."
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {}, "required": []})
    }

    async fn execute(&self, _params: HashMap<String, Value>) -> anyhow::Result<Value> {
        Ok(Value::String(GUIDELINES.to_string()))
    }
}

// ─────────────────────────────────────────────
// CheckFormattingTool
// ─────────────────────────────────────────────

/// Checks the title line, clause numbering and signature block.
pub struct CheckFormattingTool;

#[async_trait]
impl Tool for CheckFormattingTool {
    fn description(&self) -> &str {
        "Check contract formatting against the formatting rules."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "contractText": { "type": "string" },
                "formattingRules": { "type": "string" }
            },
            "required": ["contractText", "formattingRules"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<Value> {
        let text = require_string(&params, "contractText")?;
        let mut issues = Vec::new();

        if !text.trim_start().starts_with("Contract #") {
            issues.push("Missing title line 'Contract #<id>: <title>'".to_string());
        }

        let numbers: Vec<u32> = text
            .lines()
            .filter_map(|line| line.split_once(". "))
            .filter_map(|(n, _)| n.trim().parse().ok())
            .collect();
        if numbers.is_empty() {
            issues.push("No numbered clauses found".to_string());
        } else if numbers.iter().zip(1..).any(|(n, expected)| *n != expected) {
            issues.push(format!("Clause numbering is out of order: {numbers:?}"));
        }

        if !text.contains("____") {
            issues.push("Missing signature block".to_string());
        }

        Ok(json!({
            "formattingOk": issues.is_empty(),
            "details": issues,
        }))
    }
}

// ─────────────────────────────────────────────
// CheckSpellingTool
// ─────────────────────────────────────────────

pub struct CheckSpellingTool;

#[async_trait]
impl Tool for CheckSpellingTool {
    fn description(&self) -> &str {
        "Check contract text for spelling issues."
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
        let issues: Vec<Value> = text
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty())
            .filter_map(|word| {
                let lower = word.to_lowercase();
                MISSPELLINGS
                    .iter()
                    .find(|(wrong, _)| *wrong == lower)
                    .map(|(_, right)| json!({ "word": word, "suggestion": right }))
            })
            .collect();
        Ok(json!({ "spellingIssues": issues }))
    }
}

// ─────────────────────────────────────────────
// ApplyGuidelinesTool
// ─────────────────────────────────────────────

/// Lists the edits needed for the text to meet the guidelines.
pub struct ApplyGuidelinesTool;

#[async_trait]
impl Tool for ApplyGuidelinesTool {
    fn description(&self) -> &str {
        "Apply the guidelines to a contract and report the required changes."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "contractText": { "type": "string" },
                "guidelines": { "type": "string" }
            },
            "required": ["contractText", "guidelines"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<Value> {
        let text = require_string(&params, "contractText")?;
        let lower = text.to_lowercase();
        let mut changes = Vec::new();

        if !text.contains("____") {
            changes.push("Add a signature line for every party");
        }
        if !lower.contains("disclaimer") {
            changes.push("Add the standard disclaimer clause");
        }
        if lower.contains("notice") && !lower.contains("days") {
            changes.push("State the notice period in days");
        }

        Ok(json!({
            "applied": true,
            "compliant": changes.is_empty(),
            "changes": changes,
        }))
    }
}

// ─────────────────────────────────────────────
// GiveFeedbackTool
// ─────────────────────────────────────────────

pub struct GiveFeedbackTool;

#[async_trait]
impl Tool for GiveFeedbackTool {
    fn description(&self) -> &str {
        "Give feedback about the contract to the environment."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "feedback": { "type": "string" }
            },
            "required": ["feedback"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<Value> {
        let feedback = require_string(&params, "feedback")?;
        info!(feedback = %feedback, "checker feedback");
        Ok(Value::String("Feedback given to environment.".to_string()))
    }
}
