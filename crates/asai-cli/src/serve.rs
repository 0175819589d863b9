//! `asai serve` — run the web chat front-end.
//!
//! Startup sequence:
//! 1. Load config and apply CLI overrides
//! 2. Load the prompt manifest and credential, build the turn processor
//! 3. Open the session store (in memory, or JSONL on disk)
//! 4. Serve until Ctrl+C

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use asai_core::config::{load_config, Config, SessionsConfig};
use asai_core::session::SessionManager;
use asai_web::AppState;

use crate::{helpers, startup};

pub struct ServeArgs {
    pub config: Option<PathBuf>,
    pub prompt: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

fn apply_overrides(mut config: Config, args: &ServeArgs) -> Config {
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config
}

fn listen_addr(config: &Config) -> Result<SocketAddr> {
    let host = match config.server.host.as_str() {
        "localhost" => "127.0.0.1",
        other => other,
    };
    format!("{}:{}", host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                config.server.host, config.server.port
            )
        })
}

fn open_sessions(config: &SessionsConfig) -> Result<SessionManager> {
    if !config.persist {
        return Ok(SessionManager::in_memory()
            .with_limits(config.max_sessions, config.idle_ttl_secs));
    }
    let dir = helpers::expand_tilde(&config.dir);
    let sessions = SessionManager::persistent(dir.clone())
        .with_context(|| format!("failed to open sessions dir {}", dir.display()))?
        .with_limits(config.max_sessions, config.idle_ttl_secs);

    let pruned = sessions.prune_expired();
    if pruned > 0 {
        info!(pruned, "removed expired sessions");
    }
    Ok(sessions)
}

/// Run the web server.
pub async fn run(args: ServeArgs) -> Result<()> {
    helpers::print_banner("Web server");

    let config = apply_overrides(load_config(args.config.as_deref()), &args);
    let addr = listen_addr(&config)?;
    let app = startup::prepare_with(config, args.prompt.as_deref())?;

    let sessions = Arc::new(open_sessions(&app.config.sessions)?);
    let persistent = sessions.is_persistent();
    let synthesizer = app.processor.synthesizer().name().to_string();
    let model = app.processor.provider().model().to_string();

    let state = AppState::new(
        sessions,
        Arc::new(app.processor),
        app.manifest.welcome_message.as_str(),
    );

    println!("  Model:     {}", model);
    println!("  Prompt:    {}", app.prompt_path.display());
    println!("  Renders:   {}", synthesizer);
    println!(
        "  Sessions:  {}",
        if persistent {
            helpers::expand_tilde(&app.config.sessions.dir)
                .display()
                .to_string()
        } else {
            "in memory".to_string()
        }
    );
    println!("  Listening: {}", format!("http://{addr}").cyan());
    println!();
    println!("  Ctrl+C to stop");
    println!();

    tokio::select! {
        result = asai_web::serve(addr, state) => {
            result.with_context(|| format!("web server on {addr} failed"))?;
        }
        _ = tokio::signal::ctrl_c() => {
            println!();
            info!("received Ctrl+C, shutting down");
        }
    }

    println!("  Server stopped. Goodbye!");
    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use asai_core::config::DEFAULT_IDLE_TTL_SECS;

    fn args(host: Option<&str>, port: Option<u16>) -> ServeArgs {
        ServeArgs {
            config: None,
            prompt: None,
            host: host.map(String::from),
            port,
        }
    }

    #[test]
    fn cli_flags_override_config() {
        let config = apply_overrides(Config::default(), &args(Some("127.0.0.1"), Some(9000)));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn config_kept_without_flags() {
        let config = apply_overrides(Config::default(), &args(None, None));
        assert_eq!(config.server.port, 8081);
        assert_eq!(listen_addr(&config).unwrap().to_string(), "0.0.0.0:8081");
    }

    #[test]
    fn localhost_is_loopback() {
        let config = apply_overrides(Config::default(), &args(Some("localhost"), Some(80)));
        assert_eq!(listen_addr(&config).unwrap().to_string(), "127.0.0.1:80");
    }

    #[test]
    fn bad_host_is_an_error() {
        let config = apply_overrides(Config::default(), &args(Some("not a host"), None));
        assert!(listen_addr(&config).is_err());
    }

    #[test]
    fn sessions_in_memory_by_default() {
        let sessions = open_sessions(&SessionsConfig::default()).unwrap();
        assert!(!sessions.is_persistent());
        assert_eq!(sessions.idle_ttl_secs(), DEFAULT_IDLE_TTL_SECS);
    }

    #[test]
    fn sessions_on_disk_when_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionsConfig {
            persist: true,
            dir: dir.path().join("sessions").to_string_lossy().into_owned(),
            ..SessionsConfig::default()
        };
        let sessions = open_sessions(&config).unwrap();
        assert!(sessions.is_persistent());
    }

    #[test]
    fn session_ttl_comes_from_config() {
        let config = SessionsConfig {
            idle_ttl_secs: 600,
            ..SessionsConfig::default()
        };
        let sessions = open_sessions(&config).unwrap();
        assert_eq!(sessions.idle_ttl_secs(), 600);
    }
}
