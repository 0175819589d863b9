//! Text model trait implemented by every remote API client.

use async_trait::async_trait;
use asai_core::config::ModelConfig;
use asai_core::types::{HistoryEntry, LlmResponse};

use crate::error::ProviderError;

/// Configuration passed to each model call.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

impl From<&ModelConfig> for LlmRequestConfig {
    fn from(config: &ModelConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Trait that all text model providers implement.
///
/// Providers are built once at startup (with their system instruction) and
/// shared behind an `Arc`.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one chat turn.
    ///
    /// # Arguments
    /// * `history` — Prior turns, oldest first, excluding `message`.
    /// * `message` — The new user text.
    /// * `config`  — Temperature, max_tokens.
    ///
    /// Errors are returned, never folded into the reply text.
    async fn chat(
        &self,
        history: &[HistoryEntry],
        message: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError>;

    /// The model this provider calls.
    fn model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
