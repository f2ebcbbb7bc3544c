//! Pactum CLI — entry point.
//!
//! # Commands
//!
//! - `pactum run [-m PROMPT] [--document-id N]` — process a contract end to end
//! - `pactum tools [--scope SCOPE]` — print the tool definitions of one agent
//! - `pactum status` — show configuration and provider status

mod helpers;
mod status;
mod tools_cmd;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use pactum_agent::{ControllerLoop, ModelClient, RunOutcome};
use pactum_core::config::Config;
use pactum_core::state::StateStore;
use pactum_providers::http_provider::create_provider;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 📜 Pactum — multi-agent contract processing
#[derive(Parser)]
#[command(name = "pactum", version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.pactum/config.json)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the management agent until the contract is processed
    Run {
        /// Opening instruction for the management agent
        #[arg(short, long)]
        message: Option<String>,

        /// Contract to process (used when no message is given)
        #[arg(long)]
        document_id: Option<u64>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Print the tool definitions sent to the model for one agent
    Tools {
        #[arg(short, long, value_enum, default_value_t = tools_cmd::ScopeArg::Management)]
        scope: tools_cmd::ScopeArg,
    },

    /// Show configuration and provider status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            message,
            document_id,
            logs,
        } => {
            init_logging(logs);
            let config = helpers::load_cli_config(cli.config.as_deref());
            run_controller(&config, message, document_id).await
        }
        Commands::Tools { scope } => tools_cmd::run(scope),
        Commands::Status => {
            let config = helpers::load_cli_config(cli.config.as_deref());
            status::run(&config, cli.config.as_deref())
        }
    }
}

// ─────────────────────────────────────────────
// Run command
// ─────────────────────────────────────────────

async fn run_controller(config: &Config, message: Option<String>, document_id: Option<u64>) -> Result<()> {
    let prompt = helpers::task_prompt(message, document_id, &config.task);
    let controller = build_controller(config)?;

    info!(prompt = %prompt, "starting run");
    let report = controller.run(&prompt).await.context("run aborted")?;

    helpers::print_handoffs(&report.handoffs);
    match report.outcome {
        RunOutcome::Completed { answer } => {
            helpers::print_response(&answer);
            Ok(())
        }
        RunOutcome::Incomplete { reason } => {
            anyhow::bail!("run incomplete after {} iteration(s): {reason}", report.iterations)
        }
    }
}

/// Build a `ControllerLoop` from the loaded configuration.
fn build_controller(config: &Config) -> Result<ControllerLoop> {
    let provider = create_provider(&config.provider, &config.agent.model).map_err(|e| anyhow::anyhow!(e))?;
    let client = ModelClient::from_config(Arc::new(provider), config);
    let state = Arc::new(StateStore::new());
    Ok(ControllerLoop::new(Arc::new(client), state, &config.orchestration))
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("pactum=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
