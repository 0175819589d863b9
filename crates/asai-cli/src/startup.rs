//! Shared startup for `serve` and `chat`.
//!
//! Loads the config, the prompt manifest and the credential, then wires the
//! turn processor. A missing credential or an unusable manifest aborts
//! startup.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{error, info};

use asai_agent::{RenderTriggers, TurnProcessor};
use asai_core::config::{load_config, Config};
use asai_core::manifest::PromptManifest;
use asai_providers::{create_provider, create_synthesizer, resolve_api_key, LlmRequestConfig};

use crate::helpers;

/// Everything a front-end needs to start chatting.
pub struct App {
    pub config: Config,
    pub prompt_path: PathBuf,
    pub manifest: PromptManifest,
    pub processor: TurnProcessor,
}

/// The manifest path: the CLI flag wins over `promptFile`.
pub fn resolve_prompt_path(config: &Config, cli_prompt: Option<&Path>) -> PathBuf {
    match cli_prompt {
        Some(path) => path.to_path_buf(),
        None => helpers::expand_tilde(&config.prompt_file),
    }
}

pub fn prepare(config_path: Option<&Path>, cli_prompt: Option<&Path>) -> Result<App> {
    let config = load_config(config_path);
    prepare_with(config, cli_prompt)
}

pub fn prepare_with(config: Config, cli_prompt: Option<&Path>) -> Result<App> {
    let prompt_path = resolve_prompt_path(&config, cli_prompt);
    let manifest = PromptManifest::load(&prompt_path)
        .inspect_err(|e| error!(error = %e, "cannot load prompt manifest"))
        .with_context(|| format!("prompt manifest {} is required", prompt_path.display()))?;

    let api_key = resolve_api_key(config.model.provider)
        .inspect_err(|e| error!(error = %e, "missing credential"))?;

    let provider = create_provider(&config.model, api_key, &manifest.system_instruction)
        .context("failed to create text model provider")?;
    let synthesizer = create_synthesizer(&config.render);

    info!(
        provider = provider.display_name(),
        model = provider.model(),
        synthesizer = synthesizer.name(),
        prompt = %prompt_path.display(),
        "assistant ready"
    );

    let processor = TurnProcessor::new(provider, synthesizer)
        .with_triggers(RenderTriggers::new(&config.render.keywords))
        .with_request_config(LlmRequestConfig::from(&config.model));

    Ok(App {
        config,
        prompt_path,
        manifest,
        processor,
    })
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
