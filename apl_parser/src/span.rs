// SPDX-License-Identifier: MIT OR Apache-2.0
//! Source location tracking for error reporting.
//!
//! - `BytePos`: a byte offset into a command line
//! - `Span`: a half-open byte range covering a token or expression

use std::{fmt, ops::Range};

/// A byte position in source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BytePos(pub u32);

impl BytePos {
    /// Returns the byte offset as usize.
    #[inline]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for BytePos {
    fn from(pos: usize) -> Self {
        Self(pos as u32)
    }
}

impl fmt::Display for BytePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A span representing a range of source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// Start position (inclusive).
    pub start: BytePos,
    /// End position (exclusive).
    pub end: BytePos,
}

impl Span {
    /// Creates a span from byte offsets.
    #[inline]
    pub const fn from_offsets(start: u32, end: u32) -> Self {
        Self {
            start: BytePos(start),
            end: BytePos(end),
        }
    }

    /// Creates a zero-width span at a position.
    #[inline]
    pub const fn point(pos: BytePos) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Returns the length in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.0 - self.start.0
    }

    /// Returns true if the span has zero length.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start.0 == self.end.0
    }

    /// Smallest span covering both `self` and `other`.
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Converts to a `Range<usize>` for slicing.
    #[inline]
    pub const fn as_range(&self) -> Range<usize> {
        self.start.as_usize()..self.end.as_usize()
    }

    /// Extracts the spanned text from source.
    #[inline]
    pub fn extract<'a>(&self, source: &'a str) -> &'a str {
        &source[self.as_range()]
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start.0, self.end.0)
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::from_offsets(range.start as u32, range.end as u32)
    }
}

/// Computes the 1-indexed line and column (in characters) of a position.
pub fn line_col(source: &str, pos: BytePos) -> (usize, usize) {
    let offset = pos.as_usize().min(source.len());
    let mut line = 1;
    let mut col = 1;

    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }

    (line, col)
}

/// Returns the line containing a position.
pub fn get_line(source: &str, pos: BytePos) -> &str {
    let offset = pos.as_usize().min(source.len());

    let line_start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    let line_end = source[offset..]
        .find('\n')
        .map_or(source.len(), |i| offset + i);

    &source[line_start..line_end]
}
