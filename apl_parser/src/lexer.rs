// SPDX-License-Identifier: MIT OR Apache-2.0
//! Lexer for the APL expression language.
//!
//! Converts source text into a stream of tokens. Handles:
//! - Identifiers (case-sensitive, may contain `∆` and `⍙`)
//! - Numeric literals, with `¯` or an attached `-` for negatives
//! - Quoted strings (single or double quotes, doubled quote escapes)
//! - The primitives `⍳` and `⍴`, and assignment `<-` / `←`
//! - Comments introduced by `⍝`
//! - Whitespace (skipped)

use crate::span::{BytePos, Span};
use crate::token::{Token, TokenKind, HIGH_MINUS, IOTA, LAMP, LEFT_ARROW, RHO};
use std::str::Chars;

/// Returns true for characters that may start an identifier.
pub fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '∆' || c == '⍙'
}

/// Returns true for characters that may continue an identifier.
pub fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_alphanumeric()
}

/// Returns true if `text` is a complete, valid identifier.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(is_ident_start) && chars.all(is_ident_continue)
}

/// A lexer for tokenizing APL expression source.
pub struct Lexer<'a> {
    /// The full source text; spans are offsets into it.
    source: &'a str,
    /// Iterator over characters.
    chars: Chars<'a>,
    /// Current byte position.
    pos: u32,
    /// Peeked character (if any).
    peeked: Option<char>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source.
    pub fn new(source: &'a str) -> Self {
        Self::starting_at(source, 0)
    }

    /// Creates a lexer that starts scanning at byte `offset` of `source`.
    ///
    /// Spans stay relative to the whole of `source`, so diagnostics for a
    /// sub-expression point into the original line.
    pub fn starting_at(source: &'a str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        Self {
            source,
            chars: source[offset..].chars(),
            pos: offset as u32,
            peeked: None,
        }
    }

    /// Returns the current byte position.
    pub fn pos(&self) -> BytePos {
        BytePos(self.pos)
    }

    fn peek(&mut self) -> Option<char> {
        if self.peeked.is_none() {
            self.peeked = self.chars.next();
        }
        self.peeked
    }

    fn peek2(&self) -> Option<char> {
        let mut chars = self.chars.clone();
        if self.peeked.is_some() {
            chars.next()
        } else {
            chars.next();
            chars.next()
        }
    }

    fn advance(&mut self) -> Option<char> {
        let c = if let Some(c) = self.peeked.take() {
            c
        } else {
            self.chars.next()?
        };
        self.pos += c.len_utf8() as u32;
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                },
                Some(LAMP) => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                },
                _ => break,
            }
        }
    }

    fn span_from(&self, start: u32) -> Span {
        Span::from_offsets(start, self.pos)
    }

    fn scan_ident(&mut self, start: u32) -> Token {
        while self.peek().is_some_and(is_ident_continue) {
            self.advance();
        }
        let text = &self.source[start as usize..self.pos as usize];
        Token::new(TokenKind::Ident(text.to_string()), self.span_from(start))
    }

    /// Scans a number whose first character (a digit, `.`, `¯` or `-`) has
    /// already been consumed.
    fn scan_number(&mut self, start: u32, first: char) -> Token {
        let negative = first == HIGH_MINUS || first == '-';
        let digits_start = self.pos;

        let mut is_float = first == '.';
        self.eat_digits();
        if !is_float && self.peek() == Some('.') && self.peek2().is_some_and(|c| c.is_ascii_digit())
        {
            self.advance();
            self.eat_digits();
            is_float = true;
        }

        if let Some('e' | 'E') = self.peek() {
            let after = self.peek2();
            if after.is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+' || c == HIGH_MINUS)
            {
                self.advance();
                if let Some('+' | '-' | HIGH_MINUS) = self.peek() {
                    self.advance();
                }
                self.eat_digits();
                is_float = true;
            }
        }

        let body = if negative {
            &self.source[digits_start as usize..self.pos as usize]
        } else {
            &self.source[start as usize..self.pos as usize]
        };
        let mut text = body.replace(HIGH_MINUS, "-");
        if negative {
            text.insert(0, '-');
        }

        let kind = if is_float {
            match text.parse::<f64>() {
                Ok(n) => TokenKind::Float(n),
                Err(e) => TokenKind::Error(format!("invalid number '{text}': {e}")),
            }
        } else {
            match text.parse::<i64>() {
                Ok(n) => TokenKind::Integer(n),
                Err(e) => TokenKind::Error(format!("invalid integer '{text}': {e}")),
            }
        };

        Token::new(kind, self.span_from(start))
    }

    fn scan_string(&mut self, start: u32, quote: char) -> Token {
        let mut value = String::new();
        let mut terminated = false;

        while let Some(c) = self.peek() {
            self.advance();
            if c == quote {
                // A doubled quote is an escaped quote.
                if self.eat(quote) {
                    value.push(quote);
                } else {
                    terminated = true;
                    break;
                }
            } else {
                value.push(c);
            }
        }

        let kind = if terminated {
            TokenKind::String(value)
        } else {
            TokenKind::Error("unterminated string literal".to_string())
        };
        Token::new(kind, self.span_from(start))
    }

    /// Scans the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let start = self.pos;
        let Some(c) = self.advance() else {
            return Token::new(TokenKind::Eof, Span::point(BytePos(start)));
        };

        match c {
            c if is_ident_start(c) => self.scan_ident(start),
            '0'..='9' => self.scan_number(start, c),
            '.' if self.peek().is_some_and(|n| n.is_ascii_digit()) => self.scan_number(start, c),
            HIGH_MINUS | '-' if self.peek().is_some_and(|n| n.is_ascii_digit() || n == '.') => {
                self.scan_number(start, c)
            },
            '\'' | '"' => self.scan_string(start, c),
            IOTA => Token::new(TokenKind::Iota, self.span_from(start)),
            RHO => Token::new(TokenKind::Rho, self.span_from(start)),
            LEFT_ARROW => Token::new(TokenKind::Assign, self.span_from(start)),
            '<' if self.eat('-') => Token::new(TokenKind::Assign, self.span_from(start)),
            other => Token::new(
                TokenKind::Error(format!("unexpected character '{other}'")),
                self.span_from(start),
            ),
        }
    }

    /// Consumes the lexer, returning all tokens including the final EOF.
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

/// Tokenizes source text into a vector of tokens.
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).tokenize()
}
