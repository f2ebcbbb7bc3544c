//! Shared state store — the single record of contract-processing progress.
//!
//! The controller reads a fresh snapshot before every model request and the
//! controller-scoped `updateState` tool is the only writer. `merge` is a
//! **shallow** top-level overwrite: every key present in the partial replaces
//! the stored value wholesale, so nested siblings omitted from the partial fall
//! back to their defaults.
//!
//! Every level carries a flattened `extra` map, so keys outside the typed
//! fields survive a merge at any depth.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::StateError;

// ─────────────────────────────────────────────
// State shape
// ─────────────────────────────────────────────

/// Root of the shared state. Serialized with camelCase keys.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SharedState {
    pub contract: ContractState,
    /// Top-level keys beyond `contract`, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractState {
    pub text: String,
    pub terms: TermsState,
    pub communication: CommunicationState,
    /// Keys beyond the typed fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TermsState {
    pub start_date: String,
    pub end_date: String,
    pub cancellation: CancellationState,
    pub formatted: bool,
    pub spelling: bool,
    pub guidelines: bool,
    pub feedback: bool,
    /// Keys beyond the typed fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CancellationState {
    pub text: String,
    /// Keys beyond the typed fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CommunicationState {
    pub email: bool,
    /// Keys beyond the typed fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ─────────────────────────────────────────────
// Store
// ─────────────────────────────────────────────

/// Process-lifetime holder of [`SharedState`].
///
/// Shared as `Arc<StateStore>`. The lock keeps a single writer even if
/// specialists are ever run concurrently.
#[derive(Debug, Default)]
pub struct StateStore {
    inner: RwLock<SharedState>,
}

impl StateStore {
    /// Create a store with all-empty/false defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a given state.
    pub fn with_state(state: SharedState) -> Self {
        Self {
            inner: RwLock::new(state),
        }
    }

    /// Current state, by value.
    pub async fn snapshot(&self) -> SharedState {
        self.inner.read().await.clone()
    }

    /// Current state as JSON (camelCase keys), for prompts and tool results.
    pub async fn snapshot_json(&self) -> Value {
        serde_json::to_value(&*self.inner.read().await).unwrap_or_default()
    }

    /// Shallow top-level merge. Returns the replaced top-level keys.
    ///
    /// The partial must be a JSON object and every known key must keep its
    /// shape; otherwise nothing is written.
    pub async fn merge(&self, partial: Value) -> Result<Vec<String>, StateError> {
        let partial = match partial {
            Value::Object(map) => map,
            other => return Err(StateError::NotAnObject(json_kind(&other).to_string())),
        };

        let mut state = self.inner.write().await;

        let mut merged = match serde_json::to_value(&*state) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => return Err(StateError::Shape(e.to_string())),
        };

        let mut replaced = Vec::with_capacity(partial.len());
        for (key, value) in partial {
            replaced.push(key.clone());
            merged.insert(key, value);
        }

        let next: SharedState = serde_json::from_value(Value::Object(merged))
            .map_err(|e| StateError::Shape(e.to_string()))?;

        debug!(keys = ?replaced, "state merged");
        if next.contract != state.contract {
            info!(keys = ?replaced, "contract state changed");
        }
        *state = next;
        Ok(replaced)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
