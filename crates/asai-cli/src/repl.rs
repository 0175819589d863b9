//! Interactive terminal chat.
//!
//! Uses `rustyline` for readline-style editing with persistent history. The
//! conversation lives in memory for the length of the REPL; `/reset` starts
//! over.

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use asai_core::types::Conversation;
use asai_core::utils::truncate_string;

use crate::helpers;
use crate::startup::App;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// Reset command (case-insensitive match).
const RESET_COMMAND: &str = "/reset";

/// Run the interactive REPL loop.
pub async fn run(app: App) -> Result<()> {
    helpers::print_banner("Terminal chat");
    println!(
        "{}",
        "Type a message, \"/reset\" to start over, or \"exit\" to quit.".dimmed()
    );
    println!();
    println!("{}", "Asai".cyan().bold());
    println!("{}", app.manifest.welcome_message);
    println!();

    let mut editor = create_editor()?;
    let mut conversation = Conversation::new();

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => {
                // Ctrl-C
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                // Ctrl-D
                break;
            }
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        if is_exit_command(trimmed) {
            println!("\nGoodbye!");
            break;
        }

        let _ = editor.add_history_entry(&input);

        if trimmed.eq_ignore_ascii_case(RESET_COMMAND) {
            conversation = Conversation::new();
            println!("{}\n", "Conversation reset.".dimmed());
            continue;
        }

        debug!(
            turns = conversation.len(),
            input = %truncate_string(trimmed, 80),
            "processing input"
        );
        helpers::print_thinking();

        let prior_turns = conversation.len();
        match app
            .processor
            .process(trimmed, conversation.clone())
            .await
        {
            Ok(updated) => {
                helpers::clear_thinking();
                // Skip the echoed user turn.
                for turn in updated.iter().skip(prior_turns + 1) {
                    helpers::print_turn(turn);
                }
                println!();
                conversation = updated;
            }
            Err(e) => {
                helpers::clear_thinking();
                eprintln!("\n{} {e}\n", "Error:".red().bold());
            }
        }
    }

    save_history(&mut editor);

    Ok(())
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the history file.
fn history_path() -> std::path::PathBuf {
    asai_core::utils::get_data_path()
        .join("history")
        .join("chat_history")
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
