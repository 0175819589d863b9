//! Native Gemini client.
//!
//! `POST {base}/models/{model}:generateContent` with the key in the
//! `x-goog-api-key` header. Requests and responses use camelCase JSON:
//!
//! ```json
//! {
//!   "systemInstruction": { "parts": [{ "text": "..." }] },
//!   "contents": [{ "role": "user", "parts": [{ "text": "hi" }] }],
//!   "generationConfig": { "temperature": 0.7, "maxOutputTokens": 8192 }
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use asai_core::types::{HistoryEntry, LlmResponse, Role, UsageInfo};

use crate::error::ProviderError;
use crate::traits::{LlmProvider, LlmRequestConfig};

const PROVIDER: &str = "Gemini";

// ─────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

/// A reply part; non-text parts (`inlineData`, `functionCall`, ...) have no
/// `text` and are skipped.
#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

impl From<UsageMetadata> for UsageInfo {
    fn from(meta: UsageMetadata) -> Self {
        UsageInfo {
            prompt_tokens: meta.prompt_token_count,
            completion_tokens: meta.candidates_token_count,
            total_tokens: meta.total_token_count,
        }
    }
}

// ─────────────────────────────────────────────
// GeminiProvider
// ─────────────────────────────────────────────

/// Text model client for the Gemini `generateContent` API.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    system_instruction: String,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl GeminiProvider {
    /// Create a client bound to one model and system instruction.
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

        Ok(GeminiProvider {
            client,
            api_base,
            api_key,
            model: model.trim_start_matches("models/").to_string(),
            system_instruction: system_instruction.to_string(),
        })
    }

    fn generate_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/models/{}:generateContent", base, self.model)
    }

    fn build_request<'a>(
        &'a self,
        history: &'a [HistoryEntry],
        message: &'a str,
        config: &LlmRequestConfig,
    ) -> GenerateContentRequest<'a> {
        let system_instruction = (!self.system_instruction.is_empty()).then(|| Content {
            role: None,
            parts: vec![TextPart {
                text: &self.system_instruction,
            }],
        });

        let mut contents: Vec<Content<'a>> = history
            .iter()
            .map(|entry| Content {
                role: Some(entry.role.as_str()),
                parts: entry
                    .parts
                    .iter()
                    .map(|p| TextPart { text: &p.text })
                    .collect(),
            })
            .collect();
        contents.push(Content {
            role: Some(Role::User.as_str()),
            parts: vec![TextPart { text: message }],
        });

        GenerateContentRequest {
            system_instruction,
            contents,
            generation_config: GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_tokens,
            },
        }
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
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

        let body = self.build_request(history, message, config);

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
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

        let parsed = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|source| {
                error!(provider = PROVIDER, error = %source, "Failed to parse LLM response");
                ProviderError::Decode {
                    provider: PROVIDER,
                    source,
                }
            })?;

        let usage = parsed.usage_metadata.map(UsageInfo::from);
        let Some(candidate) = parsed.candidates.into_iter().next() else {
            let reason = parsed
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!("prompt blocked ({r})"))
                .unwrap_or_else(|| "no candidates".to_string());
            warn!(provider = PROVIDER, reason = %reason, "Empty response");
            return Err(ProviderError::EmptyResponse {
                provider: PROVIDER,
                reason,
            });
        };

        let content: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if content.is_empty() {
            let reason = candidate
                .finish_reason
                .map(|r| format!("finish reason {r}"))
                .unwrap_or_else(|| "empty candidate".to_string());
            warn!(provider = PROVIDER, reason = %reason, "Empty response");
            return Err(ProviderError::EmptyResponse {
                provider: PROVIDER,
                reason,
            });
        }

        debug!(
            provider = PROVIDER,
            chars = content.len(),
            finish_reason = candidate.finish_reason.as_deref().unwrap_or("?"),
            "LLM response received"
        );

        Ok(LlmResponse {
            content,
            finish_reason: candidate.finish_reason,
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_provider(api_base: &str) -> GeminiProvider {
        GeminiProvider::new(
            api_base.to_string(),
            "AIza-test".to_string(),
            "gemini-1.5-pro-latest",
            "You are Asai-Gen.",
            5,
        )
        .unwrap()
    }

    fn text_reply(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 12,
                "candidatesTokenCount": 4,
                "totalTokenCount": 16
            }
        })
    }

    #[test]
    fn test_generate_url() {
        let provider = make_provider("https://generativelanguage.googleapis.com/v1beta/");
        assert_eq!(
            provider.generate_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro-latest:generateContent"
        );
    }

    #[test]
    fn test_model_prefix_stripped() {
        let provider =
            GeminiProvider::new("http://x".into(), "k".into(), "models/gemini-pro", "", 5)
                .unwrap();
        assert_eq!(provider.model(), "gemini-pro");
    }

    #[test]
    fn test_request_shape() {
        let provider = make_provider("http://x");
        let history = vec![
            HistoryEntry::text(Role::User, "hola"),
            HistoryEntry::text(Role::Model, "¡Hola!"),
        ];
        let request = provider.build_request(&history, "next", &LlmRequestConfig::default());
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(
            value["systemInstruction"]["parts"][0]["text"],
            "You are Asai-Gen."
        );
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(value["contents"].as_array().unwrap().len(), 3);
        assert_eq!(value["contents"][1]["role"], "model");
        assert_eq!(value["contents"][2]["role"], "user");
        assert_eq!(value["contents"][2]["parts"][0]["text"], "next");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 4096);
    }

    #[tokio::test]
    async fn test_chat_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-pro-latest:generateContent"))
            .and(header("x-goog-api-key", "AIza-test"))
            .and(body_partial_json(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "Hello" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("¡Hola! Soy Asai.")))
            .mount(&mock_server)
            .await;

        let provider = make_provider(&mock_server.uri());
        let resp = provider
            .chat(&[], "Hello", &LlmRequestConfig::default())
            .await
            .unwrap();

        assert_eq!(resp.content, "¡Hola! Soy Asai.");
        assert_eq!(resp.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(resp.usage.unwrap().total_tokens, 16);
    }

    #[tokio::test]
    async fn test_chat_joins_parts() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "Concepto: " }, { "text": "loft" }] }
                }]
            })))
            .mount(&mock_server)
            .await;

        let provider = make_provider(&mock_server.uri());
        let resp = provider
            .chat(&[], "x", &LlmRequestConfig::default())
            .await
            .unwrap();
        assert_eq!(resp.content, "Concepto: loft");
        assert!(resp.usage.is_none());
    }

    #[tokio::test]
    async fn test_chat_skips_non_text_parts() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [
                        { "text": "Propuesta: " },
                        { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgo=" } },
                        { "functionCall": { "name": "lookup", "args": {} } },
                        { "text": "loft industrial" }
                    ] },
                    "finishReason": "STOP"
                }]
            })))
            .mount(&mock_server)
            .await;

        let provider = make_provider(&mock_server.uri());
        let resp = provider
            .chat(&[], "x", &LlmRequestConfig::default())
            .await
            .unwrap();
        assert_eq!(resp.content, "Propuesta: loft industrial");
    }

    #[tokio::test]
    async fn test_chat_only_non_text_parts_is_empty() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "functionCall": { "name": "lookup" } }] },
                    "finishReason": "STOP"
                }]
            })))
            .mount(&mock_server)
            .await;

        let provider = make_provider(&mock_server.uri());
        let err = provider
            .chat(&[], "x", &LlmRequestConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse { .. }));
    }

    #[tokio::test]
    async fn test_chat_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&mock_server)
            .await;

        let provider = make_provider(&mock_server.uri());
        let err = provider
            .chat(&[], "Hello", &LlmRequestConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Api { .. }));
        assert!(err.to_string().contains("API key not valid"));
    }

    #[tokio::test]
    async fn test_chat_blocked_prompt() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&mock_server)
            .await;

        let provider = make_provider(&mock_server.uri());
        let err = provider
            .chat(&[], "Hello", &LlmRequestConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::EmptyResponse { .. }));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_chat_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let provider = make_provider(&mock_server.uri());
        let err = provider
            .chat(&[], "Hello", &LlmRequestConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_chat_network_error() {
        let provider = make_provider("http://127.0.0.1:1");
        let err = provider
            .chat(&[], "Hello", &LlmRequestConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Http { .. }));
    }
}
