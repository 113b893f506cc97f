// SPDX-License-Identifier: MIT OR Apache-2.0
//! APL Parser - a hand-written parser for the APL command language.
//!
//! Turns one line of input into a [`Command`]: a keyword command (`help`,
//! `Source`, `LoadModel`, `Run`, `Layer`), an assignment, or a bare
//! expression over `⍳`, `⍴`, numeric vectors and variable names.
//!
//! # Example
//!
//! ```
//! use apl_parser::{parse_command, Command, ExprKind};
//!
//! let cmd = parse_command("A <- 2 3 ⍴ ⍳6").unwrap();
//! if let Command::Assign { name, expr } = cmd {
//!     assert_eq!(name, "A");
//!     assert!(matches!(expr.kind, ExprKind::Reshape { .. }));
//! }
//! ```

pub mod command;
pub mod error;
pub mod expr;
pub mod lexer;
pub mod span;
pub mod token;

pub use command::{parse_command, unquote, Command, Dim};
pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use expr::{parse_expr, Expr, ExprKind, ExprParser};
pub use lexer::{is_identifier, tokenize, Lexer};
pub use span::{get_line, line_col, BytePos, Span};
pub use token::{Token, TokenKind};
