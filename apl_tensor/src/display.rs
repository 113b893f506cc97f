// SPDX-License-Identifier: MIT OR Apache-2.0
//! APL-style rendering of tensors.
//!
//! Scalars print as a single number and vectors on one line. Higher ranks
//! print as matrices, one row per line with right-aligned columns, and
//! consecutive matrices separated by a blank line.

use std::fmt;

use crate::Tensor;

/// Formats one element. Integral values drop the fractional part and
/// negatives use the APL high minus.
#[must_use]
pub fn format_number(value: f32) -> String {
    let text = if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    };
    match text.strip_prefix('-') {
        Some(rest) if rest != "0" => format!("¯{rest}"),
        Some(rest) => rest.to_string(),
        None => text,
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<String> = self.values().into_iter().map(format_number).collect();
        match self.shape() {
            [] | [_] => write!(f, "{}", cells.join(" ")),
            [.., rows, cols] => {
                if cells.is_empty() {
                    return Ok(());
                }
                let (rows, cols) = (*rows, *cols);
                let mut widths = vec![0usize; cols];
                for (i, cell) in cells.iter().enumerate() {
                    let w = &mut widths[i % cols];
                    *w = (*w).max(cell.chars().count());
                }

                let mut lines = Vec::with_capacity(cells.len() / cols);
                for (r, row) in cells.chunks(cols).enumerate() {
                    if r > 0 && r % rows == 0 {
                        lines.push(String::new());
                    }
                    let padded: Vec<String> = row
                        .iter()
                        .zip(&widths)
                        .map(|(cell, &w)| format!("{cell:>w$}"))
                        .collect();
                    lines.push(padded.join(" "));
                }
                write!(f, "{}", lines.join("\n"))
            },
        }
    }
}
