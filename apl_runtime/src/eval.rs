// SPDX-License-Identifier: MIT OR Apache-2.0
//! Expression evaluation.
//!
//! Walks a parsed [`Expr`] against a variable environment. Reshape operands
//! are evaluated before the reshape itself, matching APL's right-to-left
//! order.

use apl_parser::{Expr, ExprKind};
use apl_tensor::Tensor;
use tracing::debug;

use crate::{
    environment::Environment,
    error::{EvalError, EvalResult},
};

/// Evaluates expressions parsed from one input line.
pub struct Evaluator<'a> {
    env: &'a Environment,
    source: &'a str,
    max_elements: usize,
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator. `source` is the line the expression spans point
    /// into; it is quoted in error messages.
    pub fn new(env: &'a Environment, source: &'a str, max_elements: usize) -> Self {
        Self {
            env,
            source,
            max_elements,
        }
    }

    /// Evaluates `expr` to a new tensor.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::UnknownIdentifier`] for unbound variables,
    /// [`EvalError::ShapeMismatch`] for incompatible reshapes, and
    /// [`EvalError::TooLarge`] when an iota exceeds the element limit.
    pub fn evaluate(&self, expr: &Expr) -> EvalResult<Tensor> {
        match &expr.kind {
            ExprKind::Vector(values) => Ok(Tensor::from_flat_values(values.as_slice())),
            ExprKind::Iota(n) => {
                if *n > self.max_elements {
                    return Err(EvalError::TooLarge {
                        text: self.text_of(expr),
                        elements: *n,
                        limit: self.max_elements,
                    });
                }
                Ok(Tensor::iota(*n))
            },
            ExprKind::Reshape { shape, operand } => {
                let data = self.evaluate(operand)?;
                debug!(from = ?data.shape(), to = ?shape, "reshape");
                data.reshape(shape).map_err(|source| EvalError::ShapeMismatch {
                    text: self.text_of(expr),
                    source,
                })
            },
            ExprKind::Var(name) => self
                .env
                .get(name)
                .cloned()
                .ok_or_else(|| EvalError::unknown_variable(name.as_str())),
        }
    }

    fn text_of(&self, expr: &Expr) -> String {
        let text = expr.span.extract(self.source);
        if text.is_empty() {
            expr.to_string()
        } else {
            text.to_string()
        }
    }
}
