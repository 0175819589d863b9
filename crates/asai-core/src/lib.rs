//! Asai core — conversation types, configuration, prompt manifest and the
//! per-browser session store.
//!
//! - [`types`]: `Role`, `Turn`, `Conversation` and the remote history shape
//! - [`config`]: app config schema, JSON loader and env overrides
//! - [`manifest`]: the `prompt.json` system manifest
//! - [`session`]: in-memory session cache with optional JSONL persistence

pub mod config;
pub mod manifest;
pub mod session;
pub mod types;
pub mod utils;

pub use types::{Conversation, HistoryEntry, LlmResponse, Part, Role, Session, Turn, UsageInfo};
