// SPDX-License-Identifier: MIT OR Apache-2.0
// Command-line argument parsing for the apl shell.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// apl: an APL-flavoured command interpreter for sketching model structures.
#[derive(Parser, Debug)]
#[command(name = "apl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Execute a single command and exit
    #[arg(short = 'c', long = "command", conflicts_with = "file")]
    pub command: Option<String>,

    /// Execute commands from a script file
    #[arg(short = 'f', long = "file")]
    pub file: Option<PathBuf>,

    /// Output format for non-interactive mode
    #[arg(short = 'o', long = "output", value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    /// Quiet mode: suppress the banner and script summaries
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,

    /// Do not read or write the history file
    #[arg(long = "no-history")]
    pub no_history: bool,
}

/// Output format for non-interactive results.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// APL-style text (default)
    #[default]
    Text,
    /// One JSON object per result
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_default() {
        let cli = Cli::parse_from(["apl"]);
        assert!(cli.command.is_none());
        assert!(cli.file.is_none());
        assert_eq!(cli.output_format, OutputFormat::Text);
        assert!(!cli.quiet);
        assert!(!cli.no_history);
    }

    #[test]
    fn test_cli_command() {
        let cli = Cli::parse_from(["apl", "-c", "2 3 ⍴ ⍳6"]);
        assert_eq!(cli.command, Some("2 3 ⍴ ⍳6".to_string()));
    }

    #[test]
    fn test_cli_file() {
        let cli = Cli::parse_from(["apl", "-f", "model.apl"]);
        assert_eq!(cli.file, Some(PathBuf::from("model.apl")));
    }

    #[test]
    fn test_cli_command_and_file_conflict() {
        assert!(Cli::try_parse_from(["apl", "-c", "⍳3", "-f", "x.apl"]).is_err());
    }

    #[test]
    fn test_cli_output_format() {
        let cli = Cli::parse_from(["apl", "-o", "json", "-c", "⍳3"]);
        assert_eq!(cli.output_format, OutputFormat::Json);

        let cli = Cli::parse_from(["apl", "--output", "text", "-c", "⍳3"]);
        assert_eq!(cli.output_format, OutputFormat::Text);

        assert!(Cli::try_parse_from(["apl", "-o", "csv"]).is_err());
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["apl", "-q", "--no-history"]);
        assert!(cli.quiet);
        assert!(cli.no_history);
    }
}
