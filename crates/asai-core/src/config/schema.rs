//! Configuration schema.
//!
//! Hierarchy: `Config` → `ModelConfig`, `ServerConfig`, `SessionsConfig`,
//! `RenderConfig` (→ `ImageProviderConfig`).
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};

/// Reply keywords that mark a design concept worth rendering.
///
/// Matched case-insensitively on their stem (see `asai_agent::triggers`).
pub const DEFAULT_RENDER_KEYWORDS: &[&str] = &[
    "concept:",
    "proposal:",
    "design:",
    "layout:",
    "materials:",
    "concepto:",
    "propuesta:",
    "diseño:",
    "distribución:",
    "materiales:",
];

/// Visual prompt template; `{concept}` is replaced by the model reply.
pub const DEFAULT_RENDER_PROMPT_TEMPLATE: &str = "photorealistic interior design render, 4k, \
professionally color graded, cinematic lighting.\n\
Style: {concept}.\n\
High detail, octane render, focused, sharp.";

/// Sessions kept at once before the least recently updated is evicted.
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

/// Idle time after which a session expires (one day).
pub const DEFAULT_IDLE_TTL_SECS: u64 = 86_400;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration, loaded from `~/.asai/config.json` + env vars.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub model: ModelConfig,
    pub server: ServerConfig,
    pub sessions: SessionsConfig,
    pub render: RenderConfig,
    /// Path to the `prompt.json` system manifest.
    pub prompt_file: String,
}

// ─────────────────────────────────────────────
// Model
// ─────────────────────────────────────────────

/// Which remote text API to speak.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Native Gemini `generateContent` API.
    #[default]
    Gemini,
    /// Any OpenAI-compatible `/chat/completions` API.
    Openai,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::Openai),
            other => Err(format!("unknown provider '{other}'")),
        }
    }
}

/// Remote text model settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelConfig {
    pub provider: ProviderKind,
    /// Model identifier (e.g. `"gemini-1.5-pro-latest"`).
    pub name: String,
    /// Custom API base URL (overrides the provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// HTTP timeout for one model call, in seconds.
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            name: "gemini-1.5-pro-latest".to_string(),
            api_base: None,
            max_tokens: 8192,
            temperature: 0.7,
            timeout_secs: 120,
        }
    }
}

// ─────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
        }
    }
}

// ─────────────────────────────────────────────
// Sessions
// ─────────────────────────────────────────────

/// Conversation store settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionsConfig {
    /// Write each session to a JSONL file so it survives restarts.
    pub persist: bool,
    /// Directory for session files.
    pub dir: String,
    /// Cap on stored sessions (0 = unbounded).
    pub max_sessions: usize,
    /// Idle seconds before a session expires; also the cookie `Max-Age`
    /// (0 = never expires).
    pub idle_ttl_secs: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            persist: false,
            dir: "~/.asai/sessions".to_string(),
            max_sessions: DEFAULT_MAX_SESSIONS,
            idle_ttl_secs: DEFAULT_IDLE_TTL_SECS,
        }
    }
}

// ─────────────────────────────────────────────
// Render (image synthesis)
// ─────────────────────────────────────────────

/// Which image synthesizer answers render keywords.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageMode {
    /// Never append a render turn.
    Disabled,
    /// Append an illustrative text turn with the visual prompt.
    #[default]
    Placeholder,
    /// Call an image generation API.
    Provider,
}

impl std::str::FromStr for ImageMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disabled" | "off" => Ok(ImageMode::Disabled),
            "placeholder" => Ok(ImageMode::Placeholder),
            "provider" => Ok(ImageMode::Provider),
            other => Err(format!("unknown render mode '{other}'")),
        }
    }
}

/// Render keyword detection and image synthesis settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub mode: ImageMode,
    /// Trigger keywords (case-insensitive).
    pub keywords: Vec<String>,
    /// Visual prompt template with a `{concept}` placeholder.
    pub prompt_template: String,
    pub image: ImageProviderConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: ImageMode::Placeholder,
            keywords: DEFAULT_RENDER_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            prompt_template: DEFAULT_RENDER_PROMPT_TEMPLATE.to_string(),
            image: ImageProviderConfig::default(),
        }
    }
}

/// OpenAI-compatible image generation endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    pub api_key: String,
    pub model: String,
    pub size: String,
}

impl ImageProviderConfig {
    /// Whether an API key is set.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl Default for ImageProviderConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            api_key: String::new(),
            model: "dall-e-3".to_string(),
            size: "1024x1024".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            server: ServerConfig::default(),
            sessions: SessionsConfig::default(),
            render: RenderConfig::default(),
            prompt_file: "prompt.json".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
