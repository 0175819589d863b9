//! Remote model layer for Asai.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`] — trait every text model client implements
//! - [`gemini::GeminiProvider`] — native Gemini `generateContent` client
//! - [`http_provider::HttpProvider`] — OpenAI-compatible `/chat/completions` client
//! - [`registry`] — static provider specs, credential lookup and [`create_provider`]
//! - [`image`] — the [`ImageSynthesizer`] capability and its variants

pub mod error;
pub mod gemini;
pub mod http_provider;
pub mod image;
pub mod registry;
pub mod traits;

// Re-export main types for convenience
pub use error::ProviderError;
pub use gemini::GeminiProvider;
pub use http_provider::HttpProvider;
pub use image::{
    build_visual_prompt, create_synthesizer, DisabledSynthesizer, HttpImageSynthesizer, ImageSynthesizer,
    PlaceholderSynthesizer,
};
pub use registry::{create_provider, resolve_api_key, ProviderSpec, PROVIDERS};
pub use traits::{LlmProvider, LlmRequestConfig};
