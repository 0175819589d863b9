//! `asai status` — show configuration and credential status.

use anyhow::Result;
use colored::Colorize;

use asai_core::config::{get_config_path, load_config, ImageMode};
use asai_core::manifest::PromptManifest;
use asai_core::session::SessionManager;
use asai_providers::registry::{find_by_kind, PROVIDERS};

use crate::helpers;

fn check(ok: bool, missing: &str) -> String {
    if ok {
        "✓".green().to_string()
    } else {
        missing.red().to_string()
    }
}

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None);
    let config_path = get_config_path();

    println!();
    println!("{}", "Asai Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        check(config_path.exists(), "(not found, using defaults)")
    );

    // Prompt manifest
    let prompt_path = helpers::expand_tilde(&config.prompt_file);
    let prompt_status = match PromptManifest::load(&prompt_path) {
        Ok(_) => check(true, ""),
        Err(e) => format!("{}", format!("({e})").red()),
    };
    println!(
        "  {:<18} {} {}",
        "Prompt:".bold(),
        prompt_path.display(),
        prompt_status
    );

    // Model
    let active = find_by_kind(config.model.provider);
    println!(
        "  {:<18} {} ({})",
        "Model:".bold(),
        config.model.name,
        active.display_name
    );
    println!(
        "  {:<18} {} | max_tokens: {} | timeout: {}s",
        "Parameters:".bold(),
        format!("temp: {}", config.model.temperature).dimmed(),
        format!("{}", config.model.max_tokens).dimmed(),
        config.model.timeout_secs,
    );

    // Credentials
    println!();
    println!("  {}", "Credentials:".bold());
    for spec in PROVIDERS {
        let set = std::env::var(spec.env_key)
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false);
        let status = if set {
            format!("{} ({} set)", "✓".green(), spec.env_key)
        } else if spec.kind == config.model.provider {
            format!("{}", format!("✗ {} missing (required)", spec.env_key).red())
        } else {
            format!("{}", format!("· {} not set", spec.env_key).dimmed())
        };
        println!("    {:<20} {}", spec.display_name, status);
    }

    // Renders
    println!();
    let render_status = match config.render.mode {
        ImageMode::Disabled => "disabled".dimmed().to_string(),
        ImageMode::Placeholder => "placeholder text".to_string(),
        ImageMode::Provider if config.render.image.is_configured() => {
            format!("{} ({})", "image API".green(), config.render.image.model)
        }
        ImageMode::Provider => format!(
            "{}",
            "image API without key (falls back to placeholder)".yellow()
        ),
    };
    println!("  {:<18} {}", "Renders:".bold(), render_status);
    println!(
        "  {:<18} {} keywords",
        "Triggers:".bold(),
        config.render.keywords.len()
    );

    // Sessions
    let sessions_dir = helpers::expand_tilde(&config.sessions.dir);
    let sessions_status = if !config.sessions.persist {
        "in memory".dimmed().to_string()
    } else if sessions_dir.exists() {
        let count = SessionManager::persistent(sessions_dir.clone())
            .map(|m| m.list_sessions().len())
            .unwrap_or(0);
        format!("{} ({} stored)", sessions_dir.display(), count)
    } else {
        format!("{} {}", sessions_dir.display(), "(not created yet)".dimmed())
    };
    println!("  {:<18} {}", "Sessions:".bold(), sessions_status);

    println!();

    Ok(())
}
