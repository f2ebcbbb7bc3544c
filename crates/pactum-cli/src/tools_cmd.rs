//! `pactum tools` — print the tool definitions one agent sends to the model.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ValueEnum;

use pactum_agent::specialist::SpecialistScope;
use pactum_agent::tools::{management, CheckerTool, CommunicationTool, TermsTool, ToolRegistry};
use pactum_agent::Specialist;
use pactum_core::state::StateStore;
use pactum_core::types::ToolDefinition;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    Management,
    Terms,
    Checker,
    Communication,
}

/// Definitions for one scope, as the agent sends them.
pub fn definitions(scope: ScopeArg) -> Vec<ToolDefinition> {
    match scope {
        ScopeArg::Management => {
            let state = Arc::new(StateStore::new());
            let tools = ToolRegistry::from_table(|tool| management::handler(tool, &state));
            Specialist::ALL
                .iter()
                .map(|s| s.handoff_definition())
                .chain(tools.get_definitions())
                .collect()
        }
        ScopeArg::Terms => specialist_definitions::<TermsTool>(),
        ScopeArg::Checker => specialist_definitions::<CheckerTool>(),
        ScopeArg::Communication => specialist_definitions::<CommunicationTool>(),
    }
}

fn specialist_definitions<S: SpecialistScope>() -> Vec<ToolDefinition> {
    let mut defs = ToolRegistry::from_table(S::handler).get_definitions();
    defs.push(S::SPECIALIST.return_definition());
    defs
}

/// Run the tools command.
pub fn run(scope: ScopeArg) -> Result<()> {
    let json = serde_json::to_string_pretty(&definitions(scope))
        .context("failed to serialize tool definitions")?;
    println!("{json}");
    Ok(())
}
