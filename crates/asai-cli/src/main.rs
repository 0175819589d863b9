//! Asai CLI — entry point.
//!
//! # Commands
//!
//! - `asai serve` — run the web chat front-end
//! - `asai chat` — chat with the design assistant in the terminal
//! - `asai onboard` — write a default config and sample prompt manifest
//! - `asai status` — show configuration and credential status

mod helpers;
mod onboard;
mod repl;
mod serve;
mod startup;
mod status;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Asai — interior design chat assistant
#[derive(Parser)]
#[command(name = "asai", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web chat front-end
    Serve {
        /// Config file (default: ~/.asai/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Prompt manifest (overrides `promptFile` from the config)
        #[arg(short, long)]
        prompt: Option<PathBuf>,

        /// Listen address (overrides `server.host`)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides `server.port`)
        #[arg(long)]
        port: Option<u16>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Chat in the terminal (interactive REPL)
    Chat {
        /// Config file (default: ~/.asai/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Prompt manifest (overrides `promptFile` from the config)
        #[arg(short, long)]
        prompt: Option<PathBuf>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Create the config file and a sample prompt manifest
    Onboard,

    /// Show configuration and credential status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            prompt,
            host,
            port,
            logs,
        } => {
            init_logging(logs, "info");
            serve::run(serve::ServeArgs {
                config,
                prompt,
                host,
                port,
            })
            .await
        }
        Commands::Chat {
            config,
            prompt,
            logs,
        } => {
            init_logging(logs, "warn");
            let app = startup::prepare(config.as_deref(), prompt.as_deref())?;
            repl::run(app).await
        }
        Commands::Onboard => onboard::run(),
        Commands::Status => status::run(),
    }
}

/// Initialize tracing/logging.
///
/// `--logs` forces debug output for Asai crates; otherwise `RUST_LOG`
/// applies, falling back to `default_level`.
fn init_logging(verbose: bool, default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("asai=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
