// SPDX-License-Identifier: MIT OR Apache-2.0
//! Evaluation errors.
//!
//! Every user-facing failure of the interpreter is an [`EvalError`] value.
//! Only [`EvalError::Resource`] is fatal to a running script; the rest are
//! reported for the offending line and execution continues.

use std::{fmt, path::PathBuf};

use apl_parser::ParseError;
use apl_tensor::TensorError;
use thiserror::Error;

/// What kind of name failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// A variable in the environment.
    Variable,
    /// A model preset.
    Preset,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable => write!(f, "variable"),
            Self::Preset => write!(f, "preset"),
        }
    }
}

/// Errors produced while evaluating a command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The line, a literal, a shape or an iota argument failed to parse.
    #[error("Parse error in '{text}': {}", parse_reason(.error))]
    Parse {
        /// The original input text.
        text: String,
        /// Underlying parser error, with span into `text`.
        error: ParseError,
    },

    /// Reshape requested with an incompatible element count.
    #[error("{source} in '{text}'")]
    ShapeMismatch {
        /// Text of the failing reshape expression.
        text: String,
        /// Underlying tensor error.
        source: TensorError,
    },

    /// A variable or preset name was not found.
    #[error("Unknown {kind}: {name}{}", hint_suffix(.hint))]
    UnknownIdentifier {
        /// Variable or preset.
        kind: IdentifierKind,
        /// The name that was looked up.
        name: String,
        /// Suggestion appended to the message.
        hint: Option<String>,
    },

    /// `Run` was invoked with no layers declared.
    #[error("No model loaded. Use 'LoadModel' or define layers first.")]
    MissingModel,

    /// A result would exceed the configured element limit.
    #[error("'{text}' would create {elements} elements, limit is {limit}")]
    TooLarge {
        /// Text of the failing expression.
        text: String,
        /// Requested element count.
        elements: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// A script could not be read, or `Source` nested too deeply.
    #[error("Cannot source '{}': {message}", display_path(.path))]
    Resource {
        /// Script path.
        path: PathBuf,
        /// Reason.
        message: String,
    },
}

fn parse_reason(error: &ParseError) -> String {
    error.kind.to_string()
}

fn display_path(path: &std::path::Path) -> String {
    path.display().to_string()
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_ref().map_or_else(String::new, |h| format!(". {h}"))
}

impl EvalError {
    /// Returns true if this error must stop a running script.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Resource { .. })
    }

    /// Returns the diagnostic with a caret under the offending text, when
    /// the error carries a source location; otherwise the plain message.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Parse { text, error } => error.format_with_source(text),
            other => other.to_string(),
        }
    }

    pub(crate) fn unknown_variable(name: impl Into<String>) -> Self {
        Self::UnknownIdentifier {
            kind: IdentifierKind::Variable,
            name: name.into(),
            hint: None,
        }
    }
}

/// Result type for evaluation.
pub type EvalResult<T> = Result<T, EvalError>;
