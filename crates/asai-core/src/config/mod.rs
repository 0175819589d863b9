//! Configuration system — schema, loading, and env var overrides.
//!
//! # Usage
//! ```no_run
//! use asai_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Model: {}", cfg.model.name);
//! ```

pub mod loader;
pub mod schema;

// Re-export key types
pub use loader::{get_config_path, load_config, save_config};
pub use schema::{
    Config, ImageMode, ImageProviderConfig, ModelConfig, ProviderKind, RenderConfig,
    ServerConfig, SessionsConfig, DEFAULT_IDLE_TTL_SECS, DEFAULT_MAX_SESSIONS,
};
