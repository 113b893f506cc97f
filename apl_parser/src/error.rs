// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types and diagnostics for the APL parser.
//!
//! Errors carry the span of the offending text so a shell can print the
//! line with carets underneath it.

use std::fmt;

use crate::{
    span::{get_line, line_col, Span},
    token::TokenKind,
};

/// Result type for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// A parse error with source location.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Where the error occurred.
    pub span: Span,
    /// Optional help message.
    pub help: Option<String>,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub const fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            help: None,
        }
    }

    /// Creates an "unexpected token" error.
    pub fn unexpected(found: TokenKind, span: Span, expected: impl Into<String>) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedToken {
                found,
                expected: expected.into(),
            },
            span,
        )
    }

    /// Creates an "unexpected EOF" error.
    pub fn unexpected_eof(span: Span, expected: impl Into<String>) -> Self {
        Self::new(
            ParseErrorKind::UnexpectedEof {
                expected: expected.into(),
            },
            span,
        )
    }

    /// Creates an "invalid syntax" error.
    pub fn invalid(message: impl Into<String>, span: Span) -> Self {
        Self::new(ParseErrorKind::InvalidSyntax(message.into()), span)
    }

    /// Adds a help message to the error.
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Formats the error with source context.
    #[must_use]
    #[allow(clippy::format_push_string)]
    pub fn format_with_source(&self, source: &str) -> String {
        let (line, col) = line_col(source, self.span.start);
        let line_text = get_line(source, self.span.start);

        let kind = &self.kind;
        let mut result = format!("error: {kind}\n");
        result.push_str(&format!("  --> column {col}\n"));
        result.push_str("   |\n");
        result.push_str(&format!("{line:3} | {line_text}\n"));
        result.push_str("   | ");

        for _ in 0..(col - 1) {
            result.push(' ');
        }
        let end = self.span.end.as_usize().min(source.len());
        let start = self.span.start.as_usize().min(end);
        let width = source.get(start..end).map_or(1, |s| s.chars().count());
        let remaining = line_text.chars().count().saturating_sub(col - 1);
        for _ in 0..width.min(remaining).max(1) {
            result.push('^');
        }
        result.push('\n');

        if let Some(help) = &self.help {
            result.push_str(&format!("   = help: {help}\n"));
        }

        result
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.span)
    }
}

impl std::error::Error for ParseError {}

/// Parse error kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected token
    UnexpectedToken {
        /// The token that was found.
        found: TokenKind,
        /// Description of what was expected.
        expected: String,
    },
    /// Unexpected end of input
    UnexpectedEof {
        /// Description of what was expected.
        expected: String,
    },
    /// Invalid syntax
    InvalidSyntax(String),
    /// Lexical error (bad number, stray character, unterminated string)
    Lexical(String),
    /// Reshape shape operand is not a list of non-negative integers
    InvalidShape(String),
    /// Iota argument is not a non-negative integer
    InvalidIotaArgument(String),
    /// Assignment target is not an identifier
    InvalidIdentifier(String),
    /// Command keyword given without its required argument
    MissingArgument {
        /// Command keyword.
        command: &'static str,
        /// Description of the missing argument.
        expected: &'static str,
    },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { found, expected } => {
                write!(f, "unexpected {found}, expected {expected}")
            },
            Self::UnexpectedEof { expected } => {
                write!(f, "unexpected end of input, expected {expected}")
            },
            Self::InvalidSyntax(msg) | Self::Lexical(msg) => write!(f, "{msg}"),
            Self::InvalidShape(text) => {
                write!(f, "reshape shape must be non-negative integers, got '{text}'")
            },
            Self::InvalidIotaArgument(text) => {
                write!(f, "iota argument must be a non-negative integer, got '{text}'")
            },
            Self::InvalidIdentifier(name) => write!(f, "invalid variable name '{name}'"),
            Self::MissingArgument { command, expected } => {
                write!(f, "{command} requires {expected}")
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::BytePos;

    #[test]
    fn test_parse_error_unexpected() {
        let err = ParseError::unexpected(
            TokenKind::Iota,
            Span::from_offsets(0, 3),
            "a number",
        );
        assert_eq!(err.to_string(), "unexpected ⍳, expected a number at 0..3");
    }

    #[test]
    fn test_parse_error_eof() {
        let err = ParseError::unexpected_eof(Span::point(BytePos(3)), "an integer");
        assert!(err.to_string().contains("unexpected end of input"));
    }

    #[test]
    fn test_with_help() {
        let err = ParseError::invalid("bad", Span::from_offsets(0, 1)).with_help("try ⍳5");
        assert_eq!(err.help.as_deref(), Some("try ⍳5"));
    }

    #[test]
    fn test_format_with_source_underlines_span() {
        let source = "2 x ⍴ ⍳6";
        let err = ParseError::new(
            ParseErrorKind::InvalidShape("2 x".into()),
            Span::from_offsets(0, 3),
        );
        let formatted = err.format_with_source(source);
        assert!(formatted.starts_with("error: reshape shape"));
        assert!(formatted.contains("  1 | 2 x ⍴ ⍳6"));
        assert!(formatted.contains("   | ^^^\n"));
    }

    #[test]
    fn test_format_with_source_counts_glyphs_as_one_column() {
        let source = "⍳ x";
        let err = ParseError::new(
            ParseErrorKind::InvalidIotaArgument("x".into()),
            Span::from_offsets(4, 5),
        );
        let formatted = err.format_with_source(source);
        assert!(formatted.contains("column 3"));
        assert!(formatted.contains("   |   ^\n"));
    }

    #[test]
    fn test_format_with_help() {
        let err = ParseError::invalid("oops", Span::from_offsets(0, 1)).with_help("do this");
        assert!(err.format_with_source("x").contains("= help: do this"));
    }

    #[test]
    fn test_missing_argument_display() {
        let kind = ParseErrorKind::MissingArgument {
            command: "LoadModel",
            expected: "a preset name",
        };
        assert_eq!(kind.to_string(), "LoadModel requires a preset name");
    }
}
