//! `pactum status` — show configuration and provider status.

use anyhow::Result;
use colored::Colorize;

use pactum_core::config::{get_config_path, Config};
use pactum_providers::http_provider::DEFAULT_API_BASE;

/// Run the status command.
pub fn run(config: &Config, config_path: Option<&str>) -> Result<()> {
    let config_path = config_path
        .map(crate::helpers::expand_tilde)
        .unwrap_or_else(get_config_path);

    println!();
    println!("{}", "📜 Pactum Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );

    println!("  {:<18} {}", "Model:".bold(), config.agent.model);
    println!(
        "  {:<18} {} | {}",
        "Parameters:".bold(),
        format!("temp: {}", config.agent.temperature).dimmed(),
        format!("max_tokens: {}", config.agent.max_tokens).dimmed(),
    );

    println!(
        "  {:<18} {}",
        "API base:".bold(),
        config.provider.api_base.as_deref().unwrap_or(DEFAULT_API_BASE)
    );
    let key_status = if config.provider.is_configured() {
        format!("{} (key set)", "✓".green())
    } else {
        format!("{}", "· not configured".dimmed())
    };
    println!("  {:<18} {}", "API key:".bold(), key_status);

    let orch = &config.orchestration;
    println!();
    println!("  {}", "Orchestration:".bold());
    println!("    {:<26} {}", "controller iterations", orch.max_controller_iterations);
    println!("    {:<26} {}", "specialist iterations", orch.max_specialist_iterations);
    println!("    {:<26} {}s", "request timeout", orch.request_timeout_secs);
    println!(
        "    {:<26} {} (backoff {}ms)",
        "attempts per request", orch.max_attempts, orch.retry_backoff_ms
    );

    println!();
    println!("  {:<18} #{}", "Document:".bold(), config.task.document_id);
    println!();

    Ok(())
}
