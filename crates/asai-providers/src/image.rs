//! Image synthesis: turns a design concept into a render turn.
//!
//! Three variants sit behind [`ImageSynthesizer`]:
//!
//! - [`DisabledSynthesizer`]: never produces a turn
//! - [`PlaceholderSynthesizer`]: builds the visual prompt and returns it as
//!   an illustrative text turn (the default)
//! - [`HttpImageSynthesizer`]: calls an OpenAI-compatible
//!   `/images/generations` endpoint
//!
//! Synthesis never fails the chat turn. Provider errors come back as an
//! inline `"Error generating image: ..."` turn.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use asai_core::config::{ImageMode, ImageProviderConfig, RenderConfig};
use asai_core::types::Turn;

use crate::error::ProviderError;

const DEFAULT_IMAGE_API_BASE: &str = "https://api.openai.com/v1";
const IMAGE_TIMEOUT_SECS: u64 = 120;

// ─────────────────────────────────────────────
// Trait
// ─────────────────────────────────────────────

/// Capability that produces a render turn for a model reply.
#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    /// Produce a synthesized turn for `concept` (the full model reply), or
    /// `None` when this synthesizer is switched off.
    async fn synthesize(&self, concept: &str) -> Option<Turn>;

    /// Display name for logging.
    fn name(&self) -> &str;
}

/// Fill the visual prompt template with the concept.
///
/// Templates without a `{concept}` slot get a `Style:` line appended.
pub fn build_visual_prompt(template: &str, concept: &str) -> String {
    if template.contains("{concept}") {
        template.replace("{concept}", concept)
    } else {
        format!("{}\nStyle: {}.", template.trim_end(), concept)
    }
}

// ─────────────────────────────────────────────
// Disabled
// ─────────────────────────────────────────────

/// Never appends a render turn.
#[derive(Debug, Default)]
pub struct DisabledSynthesizer;

#[async_trait]
impl ImageSynthesizer for DisabledSynthesizer {
    async fn synthesize(&self, _concept: &str) -> Option<Turn> {
        None
    }

    fn name(&self) -> &str {
        "disabled"
    }
}

// ─────────────────────────────────────────────
// Placeholder
// ─────────────────────────────────────────────

/// Returns the visual prompt wrapped in a "simulated render" notice.
#[derive(Debug)]
pub struct PlaceholderSynthesizer {
    template: String,
}

impl PlaceholderSynthesizer {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl Default for PlaceholderSynthesizer {
    fn default() -> Self {
        Self::new(asai_core::config::schema::DEFAULT_RENDER_PROMPT_TEMPLATE)
    }
}

#[async_trait]
impl ImageSynthesizer for PlaceholderSynthesizer {
    async fn synthesize(&self, concept: &str) -> Option<Turn> {
        let prompt = build_visual_prompt(&self.template, concept);
        debug!(chars = prompt.len(), "placeholder render prompt built");
        Some(Turn::synthesized(format!(
            "[Simulated render] An image would be generated with the following prompt:\n\
             {prompt}\n\n\
             (Note: image generation is not connected yet; this is a functional placeholder.)"
        )))
    }

    fn name(&self) -> &str {
        "placeholder"
    }
}

// ─────────────────────────────────────────────
// OpenAI-compatible image API
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
    b64_json: Option<String>,
}

/// Calls `POST {base}/images/generations` and attaches the result.
pub struct HttpImageSynthesizer {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    size: String,
    template: String,
}

impl std::fmt::Debug for HttpImageSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpImageSynthesizer")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl HttpImageSynthesizer {
    pub fn new(config: &ImageProviderConfig, template: &str) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(IMAGE_TIMEOUT_SECS))
            .build()
            .map_err(ProviderError::Client)?;

        Ok(Self {
            client,
            api_base: config
                .api_base
                .clone()
                .unwrap_or_else(|| DEFAULT_IMAGE_API_BASE.to_string()),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            size: config.size.clone(),
            template: template.to_string(),
        })
    }

    fn generations_url(&self) -> String {
        format!("{}/images/generations", self.api_base.trim_end_matches('/'))
    }

    async fn generate(&self, prompt: &str) -> Result<String, String> {
        let body = ImageRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: &self.size,
        };

        let response = self
            .client
            .post(self.generations_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("{status}: {text}"));
        }

        let parsed: ImageResponse = response.json().await.map_err(|e| e.to_string())?;
        let first = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| "no image returned".to_string())?;

        match (first.url, first.b64_json) {
            (Some(url), _) => Ok(url),
            (None, Some(b64)) => Ok(format!("data:image/png;base64,{b64}")),
            (None, None) => Err("image entry has neither url nor b64_json".to_string()),
        }
    }
}

#[async_trait]
impl ImageSynthesizer for HttpImageSynthesizer {
    async fn synthesize(&self, concept: &str) -> Option<Turn> {
        let prompt = build_visual_prompt(&self.template, concept);
        debug!(model = %self.model, size = %self.size, "requesting render");

        match self.generate(&prompt).await {
            Ok(url) => Some(Turn::synthesized(prompt).with_image(url)),
            Err(e) => {
                error!(error = %e, "image generation failed");
                Some(Turn::synthesized(format!("Error generating image: {e}")))
            }
        }
    }

    fn name(&self) -> &str {
        "provider"
    }
}

// ─────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────

/// Build the synthesizer selected by `render.mode`.
///
/// Provider mode without an API key falls back to the placeholder.
pub fn create_synthesizer(config: &RenderConfig) -> Arc<dyn ImageSynthesizer> {
    match config.mode {
        ImageMode::Disabled => Arc::new(DisabledSynthesizer),
        ImageMode::Placeholder => Arc::new(PlaceholderSynthesizer::new(&config.prompt_template)),
        ImageMode::Provider if !config.image.is_configured() => {
            warn!("render.mode is 'provider' but render.image.apiKey is empty, using placeholder");
            Arc::new(PlaceholderSynthesizer::new(&config.prompt_template))
        }
        ImageMode::Provider => {
            match HttpImageSynthesizer::new(&config.image, &config.prompt_template) {
                Ok(synth) => Arc::new(synth),
                Err(e) => {
                    warn!(error = %e, "could not build image client, using placeholder");
                    Arc::new(PlaceholderSynthesizer::new(&config.prompt_template))
                }
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
