//! Shared CLI helpers — path expansion, turn printing, banner.

use std::path::PathBuf;

use colored::Colorize;

use asai_core::types::Turn;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print a model turn (or a render turn) to stdout.
pub fn print_turn(turn: &Turn) {
    println!();
    if turn.synthesized {
        println!("{}", "Asai (render)".magenta().bold());
        println!("{}", turn.text.italic());
        if let Some(url) = &turn.image_url {
            println!("{}", url.underline());
        }
    } else {
        println!("{}", "Asai".cyan().bold());
        if turn.text.is_empty() {
            println!("{}", "(no response)".dimmed());
        } else {
            println!("{}", turn.text);
        }
    }
}

/// Print the banner shown at startup.
pub fn print_banner(mode: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}  {}", "Asai".cyan().bold(), version.dimmed(), mode.dimmed());
    println!();
}

/// Print a "thinking" spinner placeholder (for non-log mode).
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_tilde_home() {
        let result = expand_tilde("~/foo/bar");
        assert!(result.ends_with("foo/bar"));
        assert!(!result.starts_with("~"));
    }

    #[test]
    fn expand_tilde_no_tilde() {
        let result = expand_tilde("/absolute/path");
        assert_eq!(result, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn expand_tilde_relative() {
        let result = expand_tilde("prompt.json");
        assert_eq!(result, PathBuf::from("prompt.json"));
    }
}
