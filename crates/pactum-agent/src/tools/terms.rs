//! Terms tools — contract periods, dates and cancellation clauses.
//!
//! Extraction is plain pattern matching over the contract text: ISO dates
//! and "N days" notice periods.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use serde_json::{json, Value};
use tracing::debug;

use super::base::{require_string, require_u64, Tool};
use super::documents::load_document;
use super::scope::ToolScope;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TermsTool {
    LoadContract,
    CheckPeriods,
    ExtractDates,
    FindCancellationSection,
    ExtractCancellationInfo,
}

impl ToolScope for TermsTool {
    const SCOPE: &'static str = "terms";
    const ALL: &'static [Self] = &[
        TermsTool::LoadContract,
        TermsTool::CheckPeriods,
        TermsTool::ExtractDates,
        TermsTool::FindCancellationSection,
        TermsTool::ExtractCancellationInfo,
    ];

    fn name(self) -> &'static str {
        match self {
            TermsTool::LoadContract => "loadContract",
            TermsTool::CheckPeriods => "checkPeriods",
            TermsTool::ExtractDates => "extractDates",
            TermsTool::FindCancellationSection => "findCancellationSection",
            TermsTool::ExtractCancellationInfo => "extractCancellationInfo",
        }
    }
}

/// Handler table for the terms scope.
pub fn handler(tool: TermsTool) -> Arc<dyn Tool> {
    match tool {
        TermsTool::LoadContract => Arc::new(LoadContractTool),
        TermsTool::CheckPeriods => Arc::new(CheckPeriodsTool),
        TermsTool::ExtractDates => Arc::new(ExtractDatesTool),
        TermsTool::FindCancellationSection => Arc::new(FindCancellationSectionTool),
        TermsTool::ExtractCancellationInfo => Arc::new(ExtractCancellationInfoTool),
    }
}

// ─────────────────────────────────────────────
// Text helpers
// ─────────────────────────────────────────────

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4}-\d{2}-\d{2})\b").expect("valid date pattern"));
static DAY_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s+days?\b").expect("valid day-count pattern"));

/// Every valid ISO-8601 calendar date in `text`, in order of appearance.
fn iso_dates(text: &str) -> Vec<NaiveDate> {
    ISO_DATE
        .captures_iter(text)
        .filter_map(|c| NaiveDate::parse_from_str(&c[1], "%Y-%m-%d").ok())
        .collect()
}

/// First "N days" figure in `text`.
fn notice_days(text: &str) -> Option<u64> {
    DAY_COUNT.captures(text).and_then(|c| c[1].parse().ok())
}

fn contract_text_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "contractText": { "type": "string", "description": "Full contract text" }
        },
        "required": ["contractText"]
    })
}

// ─────────────────────────────────────────────
// LoadContractTool
// ─────────────────────────────────────────────

pub struct LoadContractTool;

#[async_trait]
impl Tool for LoadContractTool {
    fn description(&self) -> &str {
        "Load the contract text for the terms agent to process."
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
// CheckPeriodsTool
// ─────────────────────────────────────────────

/// Contract period (first two dates) and its length in days.
pub struct CheckPeriodsTool;

#[async_trait]
impl Tool for CheckPeriodsTool {
    fn description(&self) -> &str {
        "Analyze contract text for its period: start, end and duration in days."
    }

    fn parameters(&self) -> Value {
        contract_text_schema()
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<Value> {
        let text = require_string(&params, "contractText")?;
        let dates = iso_dates(&text);
        let (start, end) = match dates.as_slice() {
            [start, end, ..] => (*start, *end),
            _ => anyhow::bail!("Contract text does not state a start and end date"),
        };
        Ok(json!({
            "periodStart": start.to_string(),
            "periodEnd": end.to_string(),
            "durationDays": (end - start).num_days(),
        }))
    }
}

// ─────────────────────────────────────────────
// ExtractDatesTool
// ─────────────────────────────────────────────

pub struct ExtractDatesTool;

#[async_trait]
impl Tool for ExtractDatesTool {
    fn description(&self) -> &str {
        "Extract the start and end dates from contract text."
    }

    fn parameters(&self) -> Value {
        contract_text_schema()
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<Value> {
        let text = require_string(&params, "contractText")?;
        let dates = iso_dates(&text);
        debug!(found = dates.len(), "dates extracted");

        let first = dates
            .first()
            .ok_or_else(|| anyhow::anyhow!("No ISO dates (YYYY-MM-DD) found in contract text"))?;
        let end_date = dates.get(1).map(|d| d.to_string()).unwrap_or_default();

        Ok(json!({
            "startDate": first.to_string(),
            "endDate": end_date,
            "allDates": dates.iter().map(|d| d.to_string()).collect::<Vec<_>>(),
        }))
    }
}

// ─────────────────────────────────────────────
// FindCancellationSectionTool
// ─────────────────────────────────────────────

/// Returns the first paragraph mentioning cancellation or termination.
pub struct FindCancellationSectionTool;

#[async_trait]
impl Tool for FindCancellationSectionTool {
    fn description(&self) -> &str {
        "Locate the cancellation section in contract text."
    }

    fn parameters(&self) -> Value {
        contract_text_schema()
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<Value> {
        let text = require_string(&params, "contractText")?;
        let section = text
            .split("\n\n")
            .map(str::trim)
            .find(|p| {
                let lower = p.to_lowercase();
                lower.contains("cancel") || lower.contains("terminat")
            })
            .ok_or_else(|| anyhow::anyhow!("No cancellation section found"))?;
        Ok(Value::String(section.to_string()))
    }
}

// ─────────────────────────────────────────────
// ExtractCancellationInfoTool
// ─────────────────────────────────────────────

pub struct ExtractCancellationInfoTool;

#[async_trait]
impl Tool for ExtractCancellationInfoTool {
    fn description(&self) -> &str {
        "Extract the notice period and notice method from a cancellation section."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "cancellationSection": {
                    "type": "string",
                    "description": "Text of the cancellation section"
                }
            },
            "required": ["cancellationSection"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<Value> {
        let section = require_string(&params, "cancellationSection")?;
        let lower = section.to_lowercase();
        let method = if lower.contains("written") {
            "Written notice"
        } else {
            "Notice"
        };
        Ok(json!({
            "noticePeriodDays": notice_days(&section),
            "method": method,
            "beforeEndDate": lower.contains("before the end date"),
        }))
    }
}
