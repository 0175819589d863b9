//! Generic HTTP provider for OpenAI-compatible APIs.
//!
//! Talks to any `/chat/completions` endpoint (OpenAI, OpenRouter, vLLM,
//! Ollama, ...). The system instruction goes out as the first message and
//! model turns are sent with the `assistant` role.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use asai_core::types::{HistoryEntry, LlmResponse, Role, UsageInfo};

use crate::error::ProviderError;
use crate::traits::{LlmProvider, LlmRequestConfig};

const PROVIDER: &str = "OpenAI-compatible";

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn wire_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "assistant",
    }
}

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A text model client for any OpenAI-compatible HTTP API.
pub struct HttpProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
    model: String,
    system_instruction: String,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl HttpProvider {
    /// Create a new HttpProvider.
    ///
    /// # Arguments
    /// * `api_base`           — Base URL, with or without a trailing slash
    /// * `api_key`            — Bearer token
    /// * `model`              — Model identifier sent with every request
    /// * `system_instruction` — Sent as the leading `system` message
    /// * `timeout_secs`       — Per-request timeout
    pub fn new(
        api_base: String,
        api_key: String,
        model: &str,
        system_instruction: &str,
        timeout_secs: u64,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(ProviderError::Client)?;

        Ok(HttpProvider {
            client,
            api_base,
            api_key,
            model: model.to_string(),
            system_instruction: system_instruction.to_string(),
        })
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }

    fn build_messages<'a>(
        &'a self,
        history: &'a [HistoryEntry],
        message: &'a str,
    ) -> Vec<ChatMessage<'a>> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        if !self.system_instruction.is_empty() {
            messages.push(ChatMessage {
                role: "system",
                content: &self.system_instruction,
            });
        }
        for entry in history {
            for part in &entry.parts {
                messages.push(ChatMessage {
                    role: wire_role(entry.role),
                    content: &part.text,
                });
            }
        }
        messages.push(ChatMessage {
            role: "user",
            content: message,
        });
        messages
    }
}

#[async_trait]
impl LlmProvider for HttpProvider {
    async fn chat(
        &self,
        history: &[HistoryEntry],
        message: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError> {
        debug!(
            provider = PROVIDER,
            model = %self.model,
            history = history.len(),
            "Calling LLM"
        );

        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages: self.build_messages(history, message),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|source| {
                error!(provider = PROVIDER, error = %source, "HTTP request failed");
                ProviderError::Http {
                    provider: PROVIDER,
                    source,
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(provider = PROVIDER, status = %status, body = %body, "API error");
            return Err(ProviderError::Api {
                provider: PROVIDER,
                status,
                body,
            });
        }

        let chat_resp = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|source| {
                error!(provider = PROVIDER, error = %source, "Failed to parse LLM response");
                ProviderError::Decode {
                    provider: PROVIDER,
                    source,
                }
            })?;

        let usage = chat_resp.usage;
        let choice = chat_resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::EmptyResponse {
                provider: PROVIDER,
                reason: "no choices".to_string(),
            })?;

        let content = choice
            .message
            .content
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                let reason = choice
                    .finish_reason
                    .as_deref()
                    .map(|r| format!("empty content (finish reason {r})"))
                    .unwrap_or_else(|| "empty content".to_string());
                warn!(provider = PROVIDER, reason = %reason, "Empty response");
                ProviderError::EmptyResponse {
                    provider: PROVIDER,
                    reason,
                }
            })?;
        debug!(
            provider = PROVIDER,
            chars = content.len(),
            finish_reason = choice.finish_reason.as_deref().unwrap_or("?"),
            "LLM response received"
        );

        Ok(LlmResponse {
            content,
            finish_reason: choice.finish_reason,
            usage,
        })
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn display_name(&self) -> &str {
        PROVIDER
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
