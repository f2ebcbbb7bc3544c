//! Shared CLI helpers — path expansion, config loading, report printing.

use std::path::PathBuf;

use colored::Colorize;

use pactum_agent::{HandoffRecord, SpecialistOutcome};
use pactum_core::config::{load_config, Config, TaskConfig};

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Load config from `--config` (tilde-expanded) or the default location.
pub fn load_cli_config(path: Option<&str>) -> Config {
    match path {
        Some(p) => load_config(Some(&expand_tilde(p))),
        None => load_config(None),
    }
}

/// Resolve the controller's opening instruction.
///
/// An explicit message wins; a document id alone produces the standard
/// instruction for that document; otherwise the configured task decides.
pub fn task_prompt(message: Option<String>, document_id: Option<u64>, task: &TaskConfig) -> String {
    match (message, document_id) {
        (Some(msg), _) => msg,
        (None, Some(id)) => TaskConfig::standard_prompt(id),
        (None, None) => task.opening_prompt(),
    }
}

/// Print the controller's final answer.
pub fn print_response(response: &str) {
    println!();
    println!("{}", "📜 Pactum".cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print one line per specialist session.
pub fn print_handoffs(handoffs: &[HandoffRecord]) {
    if handoffs.is_empty() {
        println!("{}", "No specialists were involved.".dimmed());
        return;
    }
    println!("{}", "Handoffs:".bold());
    for record in handoffs {
        let status = match &record.outcome {
            SpecialistOutcome::Returned { .. } => "completed".green().to_string(),
            SpecialistOutcome::Abnormal(reason) => format!("{} ({reason})", "incomplete".red()),
        };
        println!(
            "  {:<15} {} {}",
            record.specialist.name(),
            status,
            format!("[{} iteration(s), call {}]", record.iterations, record.call_id).dimmed()
        );
    }
    println!();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
