//! `asai onboard` — initialize configuration and a sample prompt manifest.
//!
//! - Creates `~/.asai/config.json` with defaults, pointing `promptFile` at
//!   `~/.asai/prompt.json`
//! - Writes a starter manifest wherever `promptFile` points, if missing

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use asai_core::config::{get_config_path, load_config, save_config, Config};
use asai_core::manifest::SAMPLE_MANIFEST;
use asai_core::utils::get_data_path;

use crate::helpers;

/// `promptFile` written into a fresh config.
const ONBOARD_PROMPT_FILE: &str = "~/.asai/prompt.json";

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "Asai — Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    let config = ensure_config(&config_path)?;

    let prompt_path = helpers::expand_tilde(&config.prompt_file);
    create_template(&prompt_path, SAMPLE_MANIFEST)?;

    let data_dir = get_data_path();
    std::fs::create_dir_all(data_dir.join("sessions"))?;
    std::fs::create_dir_all(data_dir.join("history"))?;

    println!();
    println!(
        "{}",
        "  Setup complete! Export GOOGLE_API_KEY, then run `asai serve`.".green()
    );
    println!();

    Ok(())
}

/// Load the existing config or write a default one.
fn ensure_config(config_path: &Path) -> Result<Config> {
    if config_path.exists() {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
        return Ok(load_config(Some(config_path)));
    }

    let config = Config {
        prompt_file: ONBOARD_PROMPT_FILE.to_string(),
        ..Config::default()
    };
    save_config(&config, Some(config_path))?;
    println!(
        "  {} created config at {}",
        "✓".green(),
        config_path.display()
    );
    Ok(config)
}

/// Create a template file if it doesn't exist.
fn create_template(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("  {} {} already exists", "✓".green(), path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    println!("  {} created {}", "✓".green(), path.display());
    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use asai_core::manifest::PromptManifest;

    #[test]
    fn create_template_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prompt.json");
        create_template(&path, SAMPLE_MANIFEST).unwrap();
        assert!(PromptManifest::load(&path).is_ok());
    }

    #[test]
    fn create_template_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.json");
        std::fs::write(&path, "original").unwrap();
        create_template(&path, "new content").unwrap();
        // Should NOT overwrite
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn ensure_config_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = ensure_config(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.prompt_file, ONBOARD_PROMPT_FILE);

        // Second run keeps the file
        let again = ensure_config(&path).unwrap();
        assert_eq!(again.prompt_file, ONBOARD_PROMPT_FILE);
    }
}
