//! Runs one user message through the model and the render path.
//!
//! Flow for each message:
//! 1. append the user turn
//! 2. send the prior turns plus the new text to the text model
//! 3. append the model reply
//! 4. if the reply mentions a render keyword, ask the image synthesizer for
//!    an extra turn and append it
//!
//! A model failure is returned before anything is committed, so the caller's
//! stored conversation stays as it was.

use std::sync::Arc;

use tracing::{debug, info};

use asai_core::types::{Conversation, Turn};
use asai_providers::{ImageSynthesizer, LlmProvider, LlmRequestConfig, ProviderError};

use crate::triggers::RenderTriggers;

/// Runs chat turns against an injected model and image synthesizer.
pub struct TurnProcessor {
    provider: Arc<dyn LlmProvider>,
    synthesizer: Arc<dyn ImageSynthesizer>,
    triggers: RenderTriggers,
    request_config: LlmRequestConfig,
}

impl TurnProcessor {
    /// Create a processor with the default keywords and request config.
    pub fn new(provider: Arc<dyn LlmProvider>, synthesizer: Arc<dyn ImageSynthesizer>) -> Self {
        Self {
            provider,
            synthesizer,
            triggers: RenderTriggers::default(),
            request_config: LlmRequestConfig::default(),
        }
    }

    pub fn with_triggers(mut self, triggers: RenderTriggers) -> Self {
        self.triggers = triggers;
        self
    }

    pub fn with_request_config(mut self, config: LlmRequestConfig) -> Self {
        self.request_config = config;
        self
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    pub fn synthesizer(&self) -> &dyn ImageSynthesizer {
        self.synthesizer.as_ref()
    }

    /// Process one user message on top of `history`.
    ///
    /// Returns the extended conversation: `history`, the user turn, the
    /// model turn, and possibly one synthesized render turn.
    pub async fn process(
        &self,
        user_text: &str,
        history: Conversation,
    ) -> Result<Conversation, ProviderError> {
        let prior = history.to_history();

        debug!(
            provider = self.provider.display_name(),
            prior_turns = prior.len(),
            "processing turn"
        );

        let reply = self
            .provider
            .chat(&prior, user_text, &self.request_config)
            .await?;

        let mut conversation = history;
        conversation.push(Turn::user(user_text));
        conversation.push(Turn::model(reply.content.clone()));

        if let Some(stem) = self.triggers.matched(&reply.content) {
            info!(
                keyword = stem,
                synthesizer = self.synthesizer.name(),
                "render keyword detected"
            );
            if let Some(turn) = self.synthesizer.synthesize(&reply.content).await {
                conversation.push(turn);
            }
        }

        Ok(conversation)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
