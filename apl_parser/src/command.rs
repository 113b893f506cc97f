// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command-line classification.
//!
//! One input line becomes exactly one [`Command`]. Keywords are matched on
//! the first whitespace-delimited word, case-sensitively, in this order:
//!
//! 1. `help` (the whole line)
//! 2. `Source <path>`
//! 3. `LoadModel <name>`
//! 4. `Run <text>`
//! 5. `Layer <name> <kind> <shape...>`
//! 6. `<identifier> <- <expr>`
//! 7. anything else is a bare expression
//!
//! Matching is literal: a line beginning with the word `Run` is always a
//! run command, whatever follows.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ParseError, ParseErrorKind, ParseResult},
    expr::{Expr, ExprParser},
    lexer::is_identifier,
    span::Span,
    token::LEFT_ARROW,
};

/// The `help` keyword.
pub const HELP: &str = "help";
/// The `Source` keyword.
pub const SOURCE: &str = "Source";
/// The `LoadModel` keyword.
pub const LOAD_MODEL: &str = "LoadModel";
/// The `Run` keyword.
pub const RUN: &str = "Run";
/// The `Layer` keyword.
pub const LAYER: &str = "Layer";

/// One dimension of a declared layer shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dim {
    /// A numeric extent.
    Size(u64),
    /// A token that did not parse as an integer, kept verbatim.
    Symbol(String),
}

impl Dim {
    /// Parses a shape token leniently: integers become [`Dim::Size`],
    /// anything else is kept as [`Dim::Symbol`].
    pub fn parse(token: &str) -> Self {
        let token = unquote(token);
        token
            .parse::<u64>()
            .map_or_else(|_| Self::Symbol(token.to_string()), Self::Size)
    }

    /// Returns the numeric extent, if any.
    pub const fn size(&self) -> Option<u64> {
        match self {
            Self::Size(n) => Some(*n),
            Self::Symbol(_) => None,
        }
    }
}

impl From<u64> for Dim {
    fn from(n: u64) -> Self {
        Self::Size(n)
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Size(n) => write!(f, "{n}"),
            Self::Symbol(s) => write!(f, "{s}"),
        }
    }
}

/// A classified input line.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Blank input.
    Empty,
    /// `help`
    Help,
    /// `Source <path>`
    Source {
        /// Script path, quotes stripped.
        path: String,
    },
    /// `LoadModel <name>`
    LoadModel {
        /// Preset name, quotes stripped.
        name: String,
    },
    /// `Run <text>`
    Run {
        /// Inference input, quotes stripped. May be empty.
        input: String,
    },
    /// `Layer <name> <kind> <shape...>`
    DefineLayer {
        /// Layer name.
        name: String,
        /// Layer kind.
        kind: String,
        /// Declared shape.
        shape: Vec<Dim>,
    },
    /// `<identifier> <- <expr>`
    Assign {
        /// Variable name.
        name: String,
        /// Value expression.
        expr: Expr,
    },
    /// Bare expression.
    Eval(Expr),
}

impl Command {
    /// Returns a short name for logging.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Help => "help",
            Self::Source { .. } => "source",
            Self::LoadModel { .. } => "load_model",
            Self::Run { .. } => "run",
            Self::DefineLayer { .. } => "define_layer",
            Self::Assign { .. } => "assign",
            Self::Eval(_) => "eval",
        }
    }
}

/// Strips surrounding single or double quotes.
pub fn unquote(text: &str) -> &str {
    text.trim_matches(|c| c == '\'' || c == '"')
}

/// Splits a line into its first word and the trimmed remainder.
fn split_keyword(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, &line[line.len()..]),
    }
}

/// Byte offset of `inner` within `outer`. Both must share one allocation.
fn offset_in(outer: &str, inner: &str) -> usize {
    inner.as_ptr() as usize - outer.as_ptr() as usize
}

/// Finds the first assignment arrow, returning its byte range.
fn find_assign(line: &str) -> Option<(usize, usize)> {
    let ascii = line.find("<-").map(|i| (i, i + 2));
    let glyph = line.find(LEFT_ARROW).map(|i| (i, i + LEFT_ARROW.len_utf8()));
    match (ascii, glyph) {
        (Some(a), Some(g)) => Some(if a.0 < g.0 { a } else { g }),
        (a, g) => a.or(g),
    }
}

/// Parses one input line into a [`Command`].
///
/// Spans in returned errors and expressions are byte offsets into `line`.
///
/// # Errors
///
/// Returns a [`ParseError`] if a keyword is missing its argument, an
/// assignment target is not an identifier, or the expression is invalid.
pub fn parse_command(line: &str) -> ParseResult<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(Command::Empty);
    }
    if trimmed == HELP {
        return Ok(Command::Help);
    }

    let (keyword, rest) = split_keyword(trimmed);
    let rest_span = || {
        let start = offset_in(line, rest);
        Span::from(start..start + rest.len())
    };
    let missing = |command: &'static str, expected: &'static str| {
        ParseError::new(ParseErrorKind::MissingArgument { command, expected }, rest_span())
    };

    match keyword {
        SOURCE => {
            let path = unquote(rest);
            if path.is_empty() {
                return Err(missing(SOURCE, "a file path"));
            }
            Ok(Command::Source {
                path: path.to_string(),
            })
        },
        LOAD_MODEL => {
            let name = rest.split_whitespace().next().map(unquote).unwrap_or_default();
            if name.is_empty() {
                return Err(missing(LOAD_MODEL, "a preset name"));
            }
            Ok(Command::LoadModel {
                name: name.to_string(),
            })
        },
        RUN => Ok(Command::Run {
            input: unquote(rest).to_string(),
        }),
        LAYER => {
            let mut parts = rest.split_whitespace().map(unquote);
            match (parts.next(), parts.next()) {
                (Some(name), Some(kind)) if !name.is_empty() && !kind.is_empty() => {
                    Ok(Command::DefineLayer {
                        name: name.to_string(),
                        kind: kind.to_string(),
                        shape: parts.map(Dim::parse).collect(),
                    })
                },
                _ => Err(missing(LAYER, "a name and a kind")),
            }
        },
        _ => parse_assignment_or_expr(line),
    }
}

fn parse_assignment_or_expr(line: &str) -> ParseResult<Command> {
    let Some((arrow_start, arrow_end)) = find_assign(line) else {
        return ExprParser::new(line).parse().map(Command::Eval);
    };

    let target = &line[..arrow_start];
    let name = target.trim();
    if !is_identifier(name) {
        let start = offset_in(line, name);
        let span = if name.is_empty() {
            Span::from(arrow_start..arrow_end)
        } else {
            Span::from(start..start + name.len())
        };
        return Err(
            ParseError::new(ParseErrorKind::InvalidIdentifier(name.to_string()), span)
                .with_help("assignment looks like: A <- 2 3 ⍴ ⍳6"),
        );
    }

    let expr = ExprParser::starting_at(line, arrow_end).parse()?;
    Ok(Command::Assign {
        name: name.to_string(),
        expr,
    })
}
