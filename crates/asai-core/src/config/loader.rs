//! Config loader — reads `~/.asai/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.asai/config.json` (or an explicit path)
//! 3. Environment variables `ASAI_<SECTION>__<FIELD>` (override JSON)

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the given path (or the default path) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    load_config_from_path(&config_path)
}

/// Load config from a specific file path.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return apply_env_overrides(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return apply_env_overrides(Config::default());
        }
    };

    let config: Config = match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            return apply_env_overrides(Config::default());
        }
    };

    apply_env_overrides(config)
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Env var format: `ASAI_<SECTION>__<FIELD>` (double underscore as delimiter).
///
/// Supported overrides:
/// - `ASAI_MODEL__PROVIDER` → `model.provider`
/// - `ASAI_MODEL__NAME` → `model.name`
/// - `ASAI_MODEL__API_BASE` → `model.api_base`
/// - `ASAI_MODEL__MAX_TOKENS` → `model.max_tokens`
/// - `ASAI_MODEL__TEMPERATURE` → `model.temperature`
/// - `ASAI_MODEL__TIMEOUT_SECS` → `model.timeout_secs`
/// - `ASAI_SERVER__HOST` / `ASAI_SERVER__PORT` → `server.*`
/// - `ASAI_SESSIONS__PERSIST` / `ASAI_SESSIONS__DIR` → `sessions.*`
/// - `ASAI_SESSIONS__MAX_SESSIONS` / `ASAI_SESSIONS__IDLE_TTL_SECS` → `sessions.*`
/// - `ASAI_RENDER__MODE` → `render.mode`
/// - `ASAI_RENDER__IMAGE__API_KEY` / `ASAI_RENDER__IMAGE__API_BASE` → `render.image.*`
/// - `ASAI_PROMPT_FILE` → `prompt_file`
fn apply_env_overrides(mut config: Config) -> Config {
    // Model
    if let Ok(val) = std::env::var("ASAI_MODEL__PROVIDER") {
        match val.parse() {
            Ok(kind) => config.model.provider = kind,
            Err(e) => warn!("Ignoring ASAI_MODEL__PROVIDER: {}", e),
        }
    }
    if let Ok(val) = std::env::var("ASAI_MODEL__NAME") {
        config.model.name = val;
    }
    if let Ok(val) = std::env::var("ASAI_MODEL__API_BASE") {
        config.model.api_base = Some(val);
    }
    if let Ok(val) = std::env::var("ASAI_MODEL__MAX_TOKENS") {
        if let Ok(n) = val.parse::<u32>() {
            config.model.max_tokens = n;
        }
    }
    if let Ok(val) = std::env::var("ASAI_MODEL__TEMPERATURE") {
        if let Ok(t) = val.parse::<f64>() {
            config.model.temperature = t;
        }
    }
    if let Ok(val) = std::env::var("ASAI_MODEL__TIMEOUT_SECS") {
        if let Ok(n) = val.parse::<u64>() {
            config.model.timeout_secs = n;
        }
    }

    // Server
    if let Ok(val) = std::env::var("ASAI_SERVER__HOST") {
        config.server.host = val;
    }
    if let Ok(val) = std::env::var("ASAI_SERVER__PORT") {
        if let Ok(p) = val.parse::<u16>() {
            config.server.port = p;
        }
    }

    // Sessions
    if let Ok(val) = std::env::var("ASAI_SESSIONS__PERSIST") {
        config.sessions.persist = val == "true" || val == "1";
    }
    if let Ok(val) = std::env::var("ASAI_SESSIONS__DIR") {
        config.sessions.dir = val;
    }
    if let Ok(val) = std::env::var("ASAI_SESSIONS__MAX_SESSIONS") {
        if let Ok(n) = val.parse::<usize>() {
            config.sessions.max_sessions = n;
        }
    }
    if let Ok(val) = std::env::var("ASAI_SESSIONS__IDLE_TTL_SECS") {
        if let Ok(n) = val.parse::<u64>() {
            config.sessions.idle_ttl_secs = n;
        }
    }

    // Render
    if let Ok(val) = std::env::var("ASAI_RENDER__MODE") {
        match val.parse() {
            Ok(mode) => config.render.mode = mode,
            Err(e) => warn!("Ignoring ASAI_RENDER__MODE: {}", e),
        }
    }
    if let Ok(val) = std::env::var("ASAI_RENDER__IMAGE__API_KEY") {
        config.render.image.api_key = val;
    }
    if let Ok(val) = std::env::var("ASAI_RENDER__IMAGE__API_BASE") {
        config.render.image.api_base = Some(val);
    }

    if let Ok(val) = std::env::var("ASAI_PROMPT_FILE") {
        config.prompt_file = val;
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
