// SPDX-License-Identifier: MIT OR Apache-2.0
//! APL Shell - interactive front end for the APL command interpreter
//!
//! Provides a readline-based interface over one [`Session`]. A few shell
//! builtins (`exit`, `)vars`, `)layers`) are handled here; every other line
//! goes to the session's command dispatcher.

pub mod cli;

use apl_runtime::{LayerRecord, Outcome, Session, StructuredOutcome};
use rustyline::error::ReadlineError;
use rustyline::history::{DefaultHistory, History};
use rustyline::{DefaultEditor, Editor};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Shell configuration options.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Path to history file (None disables persistence).
    pub history_file: Option<PathBuf>,
    /// Maximum number of history entries to keep.
    pub history_size: usize,
    /// Prompt string displayed before each input.
    pub prompt: String,
    /// Suppress the startup banner.
    pub quiet: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            history_file: dirs_home().map(|h| h.join(".apl_history")),
            history_size: 1000,
            // Traditional APL input is indented six spaces.
            prompt: "      ".to_string(),
            quiet: false,
        }
    }
}

/// Returns the user's home directory if available.
fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Result of executing a shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Command executed successfully with output.
    Output(String),
    /// Shell should exit.
    Exit,
    /// Help text to display.
    Help(String),
    /// Empty input or a command with nothing to show.
    Empty,
    /// Error occurred.
    Error(String),
}

/// Interactive shell around one interpreter session.
pub struct Shell {
    session: Session,
    config: ShellConfig,
}

impl Shell {
    /// Creates a new shell with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ShellConfig::default())
    }

    /// Creates a new shell with custom configuration.
    #[must_use]
    pub fn with_config(config: ShellConfig) -> Self {
        Self::with_session(Session::new(), config)
    }

    /// Creates a shell over an existing session.
    #[must_use]
    pub const fn with_session(session: Session, config: ShellConfig) -> Self {
        Self { session, config }
    }

    /// Returns the session for direct access.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the session mutably.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Executes a single line and returns the result.
    pub fn execute(&mut self, input: &str) -> CommandResult {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return CommandResult::Empty;
        }

        match trimmed {
            "exit" | "quit" => return CommandResult::Exit,
            ")vars" => return CommandResult::Output(format_vars(&self.session.variables())),
            ")layers" => return CommandResult::Output(format_layers(&self.session.model_structure())),
            _ => {},
        }

        debug!(input = trimmed, "shell command");
        match self.session.eval(trimmed) {
            Ok(Outcome::Empty) => CommandResult::Empty,
            Ok(Outcome::Help(text)) => CommandResult::Help(text.to_string()),
            Ok(outcome) => CommandResult::Output(outcome.to_string()),
            Err(err) => CommandResult::Error(format!("Error: {}", err.render())),
        }
    }

    /// Executes a single line and renders the structured result as JSON.
    ///
    /// Shell builtins are not available here.
    #[must_use]
    pub fn execute_json(&mut self, input: &str) -> String {
        let structured = StructuredOutcome::from_result(&self.session.eval(input.trim()));
        to_json(&structured)
    }

    /// Processes a command result and returns whether to continue the loop.
    #[must_use]
    pub fn process_result(result: &CommandResult) -> LoopAction {
        match result {
            CommandResult::Output(text) | CommandResult::Help(text) => {
                println!("{text}");
                LoopAction::Continue
            },
            CommandResult::Error(text) => {
                eprintln!("{text}");
                LoopAction::Continue
            },
            CommandResult::Exit => {
                println!("Goodbye!");
                LoopAction::Exit
            },
            CommandResult::Empty => LoopAction::Continue,
        }
    }

    /// Returns the shell version string.
    #[must_use]
    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Runs the interactive shell loop.
    ///
    /// # Errors
    ///
    /// Returns an error if readline initialization fails.
    pub fn run(&mut self) -> Result<(), ShellError> {
        let mut editor: Editor<(), DefaultHistory> =
            DefaultEditor::new().map_err(|e| ShellError::Init(e.to_string()))?;
        if let Some(ref path) = self.config.history_file {
            let _ = editor.load_history(path);
        }
        editor
            .history_mut()
            .set_max_len(self.config.history_size)
            .map_err(|e| ShellError::Init(e.to_string()))?;

        if !self.config.quiet {
            println!("APL Shell v{} (device: {})", Self::version(), self.session.device_label());
            println!("Type 'help' for available commands.\n");
        }

        loop {
            match editor.readline(&self.config.prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.trim());
                    }
                    let result = self.execute(&line);
                    if Self::process_result(&result) == LoopAction::Exit {
                        break;
                    }
                },
                Err(ReadlineError::Interrupted) => println!("^C"),
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                },
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                },
            }
        }
        if let Some(ref path) = self.config.history_file {
            let _ = editor.save_history(path);
        }
        Ok(())
    }
}

/// Action to take after processing a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopAction {
    /// Continue the shell loop.
    Continue,
    /// Exit the shell.
    Exit,
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur in the shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    /// Failed to initialize readline.
    Init(String),
}

impl std::fmt::Display for ShellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Init(msg) => write!(f, "Shell initialization failed: {msg}"),
        }
    }
}

impl std::error::Error for ShellError {}

/// Serializes a structured outcome on one line.
#[must_use]
pub fn to_json(outcome: &StructuredOutcome) -> String {
    serde_json::to_string(outcome)
        .unwrap_or_else(|e| format!(r#"{{"kind":"Error","payload":"serialization failed: {e}"}}"#))
}

/// Formats the sorted variable names.
fn format_vars(names: &[&str]) -> String {
    if names.is_empty() {
        "No variables defined.".to_string()
    } else {
        names.join(" ")
    }
}

/// Formats the model structure as an ASCII table.
fn format_layers(layers: &[Arc<LayerRecord>]) -> String {
    if layers.is_empty() {
        return "No model layers defined yet.".to_string();
    }

    let columns = ["#", "Name", "Kind", "Shape", "Quantization"];
    let string_rows: Vec<[String; 5]> = layers
        .iter()
        .enumerate()
        .map(|(i, layer)| {
            [
                i.to_string(),
                layer.name.clone(),
                layer.kind.clone(),
                layer.shape_label(),
                layer.quantization.to_string(),
            ]
        })
        .collect();

    // Calculate column widths
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in &string_rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut output = String::new();

    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(col, &w)| format!("{col:w$}"))
        .collect();
    output.push_str(header.join(" | ").trim_end());
    output.push('\n');

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    output.push_str(&sep.join("-+-"));
    output.push('\n');

    for row in &string_rows {
        let formatted: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:w$}"))
            .collect();
        output.push_str(formatted.join(" | ").trim_end());
        output.push('\n');
    }

    let _ = write!(output, "({} layers)", layers.len());
    output
}
