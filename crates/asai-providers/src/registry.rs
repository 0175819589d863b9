//! Provider registry — static specs for the supported text APIs.
//!
//! Each `ProviderSpec` describes how to reach one API family: where the
//! credential lives and which base URL to use when the config has none.

use std::sync::Arc;

use asai_core::config::{ModelConfig, ProviderKind};
use tracing::debug;

use crate::error::ProviderError;
use crate::gemini::GeminiProvider;
use crate::http_provider::HttpProvider;
use crate::traits::LlmProvider;

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one provider
// ─────────────────────────────────────────────

/// Static specification describing one text API.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    /// Config selector.
    pub kind: ProviderKind,
    /// Internal name (e.g. `"gemini"`).
    pub name: &'static str,
    /// Human-readable name for logs. E.g. `"Gemini"`.
    pub display_name: &'static str,
    /// Environment variable holding the API key.
    pub env_key: &'static str,
    /// Default API base URL.
    pub default_api_base: &'static str,
}

/// All supported providers.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        kind: ProviderKind::Gemini,
        name: "gemini",
        display_name: "Gemini",
        env_key: "GOOGLE_API_KEY",
        default_api_base: "https://generativelanguage.googleapis.com/v1beta",
    },
    ProviderSpec {
        kind: ProviderKind::Openai,
        name: "openai",
        display_name: "OpenAI-compatible",
        env_key: "OPENAI_API_KEY",
        default_api_base: "https://api.openai.com/v1",
    },
];

/// Find the spec for a provider kind.
pub fn find_by_kind(kind: ProviderKind) -> &'static ProviderSpec {
    PROVIDERS
        .iter()
        .find(|spec| spec.kind == kind)
        .unwrap_or(&PROVIDERS[0])
}

// ─────────────────────────────────────────────
// Credentials
// ─────────────────────────────────────────────

/// Read the API key for `kind` from the process environment.
///
/// A missing or empty variable is an error; the app cannot start without it.
pub fn resolve_api_key(kind: ProviderKind) -> Result<String, ProviderError> {
    resolve_api_key_with(kind, |var| std::env::var(var).ok())
}

fn resolve_api_key_with(
    kind: ProviderKind,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String, ProviderError> {
    let spec = find_by_kind(kind);
    lookup(spec.env_key)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or(ProviderError::MissingApiKey {
            env_key: spec.env_key,
        })
}

// ─────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────

/// Build the configured text model client.
///
/// This is the main entry point: it picks the provider from the config and
/// bakes in the system instruction.
pub fn create_provider(
    config: &ModelConfig,
    api_key: String,
    system_instruction: &str,
) -> Result<Arc<dyn LlmProvider>, ProviderError> {
    let spec = find_by_kind(config.provider);
    let api_base = config
        .api_base
        .clone()
        .unwrap_or_else(|| spec.default_api_base.to_string());

    debug!(
        provider = spec.display_name,
        model = %config.name,
        api_base = %api_base,
        "Creating text model provider"
    );

    let provider: Arc<dyn LlmProvider> = match config.provider {
        ProviderKind::Gemini => Arc::new(GeminiProvider::new(
            api_base,
            api_key,
            &config.name,
            system_instruction,
            config.timeout_secs,
        )?),
        ProviderKind::Openai => Arc::new(HttpProvider::new(
            api_base,
            api_key,
            &config.name,
            system_instruction,
            config.timeout_secs,
        )?),
    };

    Ok(provider)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
