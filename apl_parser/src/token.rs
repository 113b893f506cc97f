// SPDX-License-Identifier: MIT OR Apache-2.0
//! Token types for the APL expression language.

use crate::span::Span;
use std::fmt;

/// The iota glyph.
pub const IOTA: char = '⍳';
/// The rho (reshape) glyph.
pub const RHO: char = '⍴';
/// The APL high minus, used as a negative-number prefix.
pub const HIGH_MINUS: char = '¯';
/// The APL assignment arrow.
pub const LEFT_ARROW: char = '←';
/// The APL comment lamp.
pub const LAMP: char = '⍝';

/// A token with its span.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[inline]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns true if this is an EOF token.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Returns true if this token is a numeric literal.
    #[inline]
    pub fn is_number(&self) -> bool {
        matches!(self.kind, TokenKind::Integer(_) | TokenKind::Float(_))
    }
}

/// Token kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// A variable name
    Ident(String),
    /// An integer literal (no fractional part or exponent)
    Integer(i64),
    /// A floating-point literal
    Float(f64),
    /// A quoted string (content without quotes)
    String(String),
    /// `⍳`
    Iota,
    /// `⍴`
    Rho,
    /// `<-` or `←`
    Assign,
    /// End of input
    Eof,
    /// Lexical error
    Error(String),
}

impl TokenKind {
    /// Returns a short description for diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Ident(_) => "identifier",
            TokenKind::Integer(_) => "integer",
            TokenKind::Float(_) => "number",
            TokenKind::String(_) => "string",
            TokenKind::Iota => "⍳",
            TokenKind::Rho => "⍴",
            TokenKind::Assign => "<-",
            TokenKind::Eof => "end of input",
            TokenKind::Error(_) => "error",
        }
    }

    /// Returns the numeric value of a literal.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            TokenKind::Integer(n) => Some(*n as f64),
            TokenKind::Float(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(s) => write!(f, "identifier '{s}'"),
            TokenKind::Integer(n) => write!(f, "{n}"),
            TokenKind::Float(n) => write!(f, "{n}"),
            TokenKind::String(s) => write!(f, "'{s}'"),
            TokenKind::Error(e) => write!(f, "error: {e}"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}
