// SPDX-License-Identifier: MIT OR Apache-2.0
//! Expression parser for the APL right-hand-side grammar.
//!
//! ```text
//! expr         := reshape_expr | iota_expr | vector_expr | var_ref
//! reshape_expr := integer+ '⍴' expr
//! iota_expr    := '⍳' integer
//! vector_expr  := number+
//! var_ref      := identifier
//! ```
//!
//! Reshape splits at the leftmost `⍴`, so the right operand is parsed first
//! in the APL right-to-left sense: `2 2 ⍴ 4 ⍴ ⍳4` reshapes `⍳4` twice. The
//! remaining rules are tried in order; each either declines (the tokens are
//! not of its form) or commits and returns a typed result.

use std::fmt;

use crate::{
    error::{ParseError, ParseErrorKind, ParseResult},
    lexer::Lexer,
    span::Span,
    token::{Token, TokenKind},
};

/// A parsed expression with its source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression forms.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// Literal vector of numbers. A single number is a 1-element vector.
    Vector(Vec<f32>),
    /// `⍳n`
    Iota(usize),
    /// `shape ⍴ operand`
    Reshape {
        /// Target shape.
        shape: Vec<usize>,
        /// Data operand.
        operand: Box<Expr>,
    },
    /// Variable reference.
    Var(String),
}

impl Expr {
    /// Creates a new expression.
    #[must_use]
    pub const fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Vector(values) => {
                let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(" "))
            },
            ExprKind::Iota(n) => write!(f, "⍳{n}"),
            ExprKind::Reshape { shape, operand } => {
                let dims: Vec<String> = shape.iter().map(ToString::to_string).collect();
                write!(f, "{} ⍴ {operand}", dims.join(" "))
            },
            ExprKind::Var(name) => write!(f, "{name}"),
        }
    }
}

/// Parser over the token stream of one expression.
pub struct ExprParser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
}

impl<'a> ExprParser<'a> {
    /// Creates a parser for the whole of `source`.
    pub fn new(source: &'a str) -> Self {
        Self::starting_at(source, 0)
    }

    /// Creates a parser for the expression beginning at byte `offset`.
    pub fn starting_at(source: &'a str, offset: usize) -> Self {
        let mut tokens = Lexer::starting_at(source, offset).tokenize();
        // Drop the trailing EOF; its position is kept by `end_span`.
        tokens.pop();
        Self { source, tokens }
    }

    fn end_span(&self) -> Span {
        let end = self.tokens.last().map_or(self.source.len(), |t| t.span.end.as_usize());
        Span::from(end..end)
    }

    /// Parses the token stream as one expression.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the input is empty, contains a lexical
    /// error, or matches no grammar rule.
    pub fn parse(&self) -> ParseResult<Expr> {
        let lexical = self.tokens.iter().find_map(|t| match &t.kind {
            TokenKind::Error(msg) => Some((msg.clone(), t.span)),
            _ => None,
        });
        if let Some((msg, span)) = lexical {
            return Err(ParseError::new(ParseErrorKind::Lexical(msg), span));
        }
        self.parse_tokens(&self.tokens)
    }

    fn parse_tokens(&self, tokens: &[Token]) -> ParseResult<Expr> {
        let Some(first) = tokens.first() else {
            return Err(ParseError::unexpected_eof(self.end_span(), "an expression"));
        };
        let span = covering(tokens);

        if let Some(rho) = tokens.iter().position(|t| t.kind == TokenKind::Rho) {
            return self.parse_reshape(tokens, rho);
        }

        let attempts: [fn(&Self, &[Token], Span) -> Option<ParseResult<Expr>>; 3] =
            [Self::try_iota, Self::try_vector, Self::try_var];
        for attempt in attempts {
            if let Some(result) = attempt(self, tokens, span) {
                return result;
            }
        }

        let found = tokens
            .iter()
            .find(|t| !t.is_number())
            .unwrap_or(first);
        Err(ParseError::unexpected(
            found.kind.clone(),
            found.span,
            "a number, ⍳, ⍴, or a variable name",
        ))
    }

    fn parse_reshape(&self, tokens: &[Token], rho: usize) -> ParseResult<Expr> {
        let (left, right) = (&tokens[..rho], &tokens[rho + 1..]);
        if left.is_empty() {
            return Err(ParseError::invalid(
                "⍴ requires a shape on its left",
                tokens[rho].span,
            )
            .with_help("write the target shape first, e.g. 2 3 ⍴ ⍳6"));
        }

        let shape_span = covering(left);
        let shape = left
            .iter()
            .map(|t| match t.kind {
                TokenKind::Integer(n) => usize::try_from(n).ok(),
                _ => None,
            })
            .collect::<Option<Vec<usize>>>()
            .ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::InvalidShape(shape_span.extract(self.source).to_string()),
                    shape_span,
                )
            })?;

        let operand = self.parse_tokens(right)?;
        Ok(Expr::new(
            ExprKind::Reshape {
                shape,
                operand: Box::new(operand),
            },
            covering(tokens),
        ))
    }

    fn try_iota(&self, tokens: &[Token], span: Span) -> Option<ParseResult<Expr>> {
        let (first, rest) = tokens.split_first()?;
        if first.kind != TokenKind::Iota {
            return None;
        }
        Some(match rest {
            [] => Err(ParseError::unexpected_eof(self.end_span(), "an integer after ⍳")),
            [arg] => match arg.kind {
                TokenKind::Integer(n) if n >= 0 => usize::try_from(n)
                    .map(|n| Expr::new(ExprKind::Iota(n), span))
                    .map_err(|_| self.bad_iota(arg.span)),
                _ => Err(self.bad_iota(arg.span)),
            },
            [_, ..] => Err(self.bad_iota(covering(rest))),
        })
    }

    fn bad_iota(&self, span: Span) -> ParseError {
        ParseError::new(
            ParseErrorKind::InvalidIotaArgument(span.extract(self.source).to_string()),
            span,
        )
    }

    #[allow(clippy::cast_possible_truncation, clippy::unused_self)]
    fn try_vector(&self, tokens: &[Token], span: Span) -> Option<ParseResult<Expr>> {
        let values = tokens
            .iter()
            .map(|t| t.kind.as_number().map(|n| n as f32))
            .collect::<Option<Vec<f32>>>()?;
        Some(Ok(Expr::new(ExprKind::Vector(values), span)))
    }

    #[allow(clippy::unused_self)]
    fn try_var(&self, tokens: &[Token], span: Span) -> Option<ParseResult<Expr>> {
        match tokens {
            [Token {
                kind: TokenKind::Ident(name),
                ..
            }] => Some(Ok(Expr::new(ExprKind::Var(name.clone()), span))),
            _ => None,
        }
    }
}

/// Span from the first to the last token of a non-empty slice.
fn covering(tokens: &[Token]) -> Span {
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => first.span.merge(last.span),
        _ => Span::default(),
    }
}

/// Parses an expression string.
///
/// # Errors
///
/// Returns a [`ParseError`] if `source` is not a valid expression.
pub fn parse_expr(source: &str) -> ParseResult<Expr> {
    ExprParser::new(source).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(source: &str) -> ExprKind {
        parse_expr(source).unwrap().kind
    }

    fn err_kind(source: &str) -> ParseErrorKind {
        parse_expr(source).unwrap_err().kind
    }

    #[test]
    fn test_iota() {
        assert_eq!(kind("⍳5"), ExprKind::Iota(5));
        assert_eq!(kind("⍳ 0"), ExprKind::Iota(0));
    }

    #[test]
    fn test_single_number_is_vector() {
        assert_eq!(kind("10"), ExprKind::Vector(vec![10.0]));
    }

    #[test]
    fn test_vector_literal() {
        assert_eq!(kind("1 2.5 ¯3"), ExprKind::Vector(vec![1.0, 2.5, -3.0]));
    }

    #[test]
    fn test_variable() {
        assert_eq!(kind("weights"), ExprKind::Var("weights".into()));
    }

    #[test]
    fn test_reshape_of_iota() {
        let expr = parse_expr("2 3 ⍴ ⍳6").unwrap();
        match expr.kind {
            ExprKind::Reshape { shape, operand } => {
                assert_eq!(shape, vec![2, 3]);
                assert_eq!(operand.kind, ExprKind::Iota(6));
                assert_eq!(operand.span, Span::from_offsets(8, 12));
            },
            other => panic!("expected reshape, got {other:?}"),
        }
        assert_eq!(expr.span, Span::from_offsets(0, 12));
    }

    #[test]
    fn test_nested_reshape_right_to_left() {
        match kind("2 2 ⍴ 4 ⍴ ⍳4") {
            ExprKind::Reshape { shape, operand } => {
                assert_eq!(shape, vec![2, 2]);
                assert!(matches!(
                    operand.kind,
                    ExprKind::Reshape { ref shape, .. } if shape == &vec![4]
                ));
            },
            other => panic!("expected reshape, got {other:?}"),
        }
    }

    #[test]
    fn test_reshape_of_variable() {
        match kind("3 ⍴ A") {
            ExprKind::Reshape { operand, .. } => {
                assert_eq!(operand.kind, ExprKind::Var("A".into()));
            },
            other => panic!("expected reshape, got {other:?}"),
        }
    }

    #[test]
    fn test_reshape_bad_shape() {
        assert_eq!(
            err_kind("2 x ⍴ ⍳6"),
            ParseErrorKind::InvalidShape("2 x".into())
        );
        assert_eq!(
            err_kind("2.5 ⍴ ⍳6"),
            ParseErrorKind::InvalidShape("2.5".into())
        );
        assert_eq!(
            err_kind("¯2 ⍴ ⍳6"),
            ParseErrorKind::InvalidShape("¯2".into())
        );
    }

    #[test]
    fn test_reshape_missing_shape() {
        let err = parse_expr("⍴ ⍳6").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidSyntax(_)));
        assert!(err.help.is_some());
    }

    #[test]
    fn test_reshape_missing_operand() {
        assert!(matches!(
            err_kind("2 3 ⍴"),
            ParseErrorKind::UnexpectedEof { .. }
        ));
    }

    #[test]
    fn test_iota_bad_arguments() {
        assert_eq!(
            err_kind("⍳¯1"),
            ParseErrorKind::InvalidIotaArgument("¯1".into())
        );
        assert_eq!(
            err_kind("⍳2.5"),
            ParseErrorKind::InvalidIotaArgument("2.5".into())
        );
        assert_eq!(
            err_kind("⍳N"),
            ParseErrorKind::InvalidIotaArgument("N".into())
        );
        assert_eq!(
            err_kind("⍳1 2"),
            ParseErrorKind::InvalidIotaArgument("1 2".into())
        );
        assert!(matches!(err_kind("⍳"), ParseErrorKind::UnexpectedEof { .. }));
    }

    #[test]
    fn test_empty_expression() {
        assert!(matches!(err_kind(""), ParseErrorKind::UnexpectedEof { .. }));
        assert!(matches!(err_kind("   "), ParseErrorKind::UnexpectedEof { .. }));
    }

    #[test]
    fn test_lexical_error_reported() {
        let err = parse_expr("A + B").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::Lexical(_)));
        assert_eq!(err.span, Span::from_offsets(2, 3));
    }

    #[test]
    fn test_no_rule_matches() {
        let err = parse_expr("A B").unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::UnexpectedToken { .. }
        ));
        let err = parse_expr("1 A").unwrap_err();
        assert_eq!(err.span, Span::from_offsets(2, 3));
    }

    #[test]
    fn test_parser_starting_at_offset() {
        let line = "A <- ⍳3";
        let expr = ExprParser::starting_at(line, 5).parse().unwrap();
        assert_eq!(expr.kind, ExprKind::Iota(3));
        assert_eq!(expr.span.extract(line), "⍳3");
    }

    #[test]
    fn test_display_round_trip_text() {
        assert_eq!(parse_expr("2 3 ⍴ ⍳6").unwrap().to_string(), "2 3 ⍴ ⍳6");
    }
}
